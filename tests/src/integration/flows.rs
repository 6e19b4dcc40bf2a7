//! # Integration Test Flows
//!
//! Full record lifecycles through the dispatcher:
//!
//! 1. **Create → foreign update → port-out → query → churn-out**
//! 2. **Bulk ingestion** with mixed good and bad items
//! 3. **Failure surfaces**: ledger outage, event sink refusal, missing identity
//!
//! Events are observed through a live subscription on the event sink, the
//! way an off-chain listener would see them.

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{arg, args, record, Harness};
    use cpm_preferences::prelude::*;
    use serde_json::{json, Value};
    use std::time::Duration;
    use tokio::sync::broadcast;
    use tokio::time::timeout;

    async fn next_event(rx: &mut broadcast::Receiver<EmittedEvent>) -> (String, EventPayload) {
        let event = timeout(Duration::from_millis(100), rx.recv())
            .await
            .expect("timeout waiting for event")
            .expect("should receive event");
        let payload = event.decode().expect("payload is {data, txid}");
        (event.name, payload)
    }

    // =========================================================================
    // LIFECYCLE
    // =========================================================================

    #[tokio::test]
    async fn test_full_lifecycle_scenario() {
        let h = Harness::new();
        let mut rx = h.events.subscribe();
        let phone = "9876543210";

        // OrgA creates
        let (resp, tx) = h.call_as("OrgA", "sp", arg(&record(phone))).await;
        assert!(resp.is_ok(), "{}", resp.message);
        assert_eq!(
            resp.payload_str(),
            format!("setPreferences : Preferences data added Successfully for MSISDN : {phone} , TransactionID {tx}")
        );
        let (name, payload) = next_event(&mut rx).await;
        assert_eq!(name, topics::ADD_PREFERENCES);
        assert_eq!(payload.txid, tx);
        let emitted: Value = serde_json::from_str(&payload.data).unwrap();
        assert_eq!(emitted["uby"], "OrgA");
        assert_eq!(emitted["obj"], "Preferences");

        // OrgB cannot overwrite
        let mut hijack = record(phone);
        hijack["svcprv"] = json!("EVIL");
        let resp = h.call("OrgB", "sp", arg(&hijack)).await;
        assert_eq!(resp.status, Response::ERROR);
        assert_eq!(resp.message, "Unauthorized Access");
        assert_eq!(h.stored(phone).unwrap()["svcprv"], "P1");
        assert!(rx.try_recv().is_err());

        // OrgA ports out to P2
        let (resp, tx) = h
            .call_as("OrgA", "po", args(&[phone, "P2", "2020-02-02T00:00:00Z"]))
            .await;
        assert_eq!(
            resp.payload_str(),
            format!("portOut : PutState Success for MSISDN : {phone} , TransactionID : {tx}")
        );
        let (name, payload) = next_event(&mut rx).await;
        assert_eq!(name, topics::PORT_OUT);
        let ported: Value = serde_json::from_str(&payload.data).unwrap();
        assert_eq!(ported["svcprv"], "P2");
        assert_eq!(ported["uts"], "2020-02-02T00:00:00Z");
        assert_eq!(ported["cts"], "2019-05-01T10:00:00Z");
        assert_eq!(ported["lrn"], "5501");

        // Query finds it
        let resp = h
            .call("OrgC", "qp", args(&[r#"{"selector":{"svcprv":"P2"}}"#]))
            .await;
        let rows: Vec<Value> = serde_json::from_slice(&resp.payload).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["Key"], phone);
        assert_eq!(rows[0]["Record"], ported);

        // OrgA churns out, then again
        let (resp, tx) = h.call_as("OrgA", "dp", args(&[phone])).await;
        assert!(resp.is_ok());
        let (name, payload) = next_event(&mut rx).await;
        assert_eq!(name, topics::DELETE_PREFERENCES);
        assert_eq!(payload, EventPayload { data: phone.into(), txid: tx });
        assert!(h.stored(phone).is_none());

        let resp = h.call("OrgA", "dp", args(&[phone])).await;
        assert!(resp.is_ok());
        assert_eq!(
            resp.payload_str(),
            format!("delPreferences : No Existing preferences for MSISDN : {phone}")
        );
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_update_replaces_fields_but_keeps_create_ts() {
        let h = Harness::new();
        let phone = "9123456780";
        h.call("OrgA", "sp", arg(&record(phone))).await;

        let mut next = record(phone);
        next["cmode"] = json!("SMS");
        next["day"] = json!("WEEKEND");
        next["cts"] = json!("1999-01-01T00:00:00Z");
        let resp = h.call("OrgA", "sp", arg(&next)).await;
        assert!(resp.payload_str().starts_with("setPreferences : Preferences data updated"));

        let stored = h.stored(phone).unwrap();
        assert_eq!(stored["cmode"], "SMS");
        assert_eq!(stored["day"], "WEEKEND");
        assert_eq!(stored["cts"], "2019-05-01T10:00:00Z");
        assert_eq!(
            h.events.event_names(),
            vec![topics::ADD_PREFERENCES, topics::UPDATE_PREFERENCES]
        );
    }

    #[tokio::test]
    async fn test_ported_record_stays_with_porting_org() {
        let h = Harness::new();
        let phone = "9000000001";
        h.call("OrgA", "sp", arg(&record(phone))).await;
        h.call("OrgA", "po", args(&[phone, "P7", "t7"])).await;

        // owner is still the org that ran the port-out
        assert_eq!(h.stored(phone).unwrap()["uby"], "OrgA");
        let resp = h.call("OrgB", "po", args(&[phone, "P8", "t8"])).await;
        assert_eq!(resp.message, "Unauthorized Access");
        assert_eq!(h.stored(phone).unwrap()["svcprv"], "P7");
    }

    // =========================================================================
    // BULK INGESTION
    // =========================================================================

    #[tokio::test]
    async fn test_batch_with_mixed_items() {
        let h = Harness::new();
        h.call("OrgB", "sp", arg(&record("5555555555"))).await;
        h.events.clear();

        let mut bad_lrn = record("4444444444");
        bad_lrn["lrn"] = json!("44-44");
        let items = vec![
            record("1111111111").to_string(),
            record("22222x2222").to_string(),
            record("3333333333").to_string(),
            bad_lrn.to_string(),
            record("5555555555").to_string(),
        ];

        let resp = h.call("OrgA", "abp", items.clone()).await;
        assert!(resp.is_ok(), "partial failure is success-shaped");
        let text = resp.payload_str().into_owned();
        let body = text
            .strip_prefix("batchPreferences : Updating batch Error : ")
            .expect("error prefix");
        let entries: Vec<Value> = body
            .split('|')
            .map(|e| serde_json::from_str(e).unwrap())
            .collect();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0]["data"], "22222x2222");
        assert_eq!(
            entries[0]["error"],
            "MobileNumber must contain only numeric characters"
        );
        assert_eq!(entries[1]["data"], "44-44");
        assert_eq!(entries[2]["data"], items[4]);
        assert_eq!(entries[2]["error"], "Unauthorized Access");

        assert!(h.stored("1111111111").is_some());
        assert!(h.stored("3333333333").is_some());
        assert!(h.stored("22222x2222").is_none());
        assert!(h.stored("4444444444").is_none());
        assert_eq!(h.stored("5555555555").unwrap()["uby"], "OrgB");
        assert_eq!(
            h.events.event_names(),
            vec![topics::ADD_PREFERENCES, topics::ADD_PREFERENCES]
        );
    }

    #[tokio::test]
    async fn test_clean_batch_reports_transaction() {
        let h = Harness::new();
        h.call("OrgA", "sp", arg(&record("1111111111"))).await;

        let items = vec![
            record("1111111111").to_string(),
            record("2222222222").to_string(),
        ];
        let (resp, tx) = h.call_as("OrgA", "abp", items).await;
        assert_eq!(
            resp.payload_str(),
            format!("batchPreferences : Batch Preferences data added Successfully. TransactionID : {tx}")
        );
        assert_eq!(
            h.events.event_names(),
            vec![
                topics::ADD_PREFERENCES,
                topics::UPDATE_PREFERENCES,
                topics::ADD_PREFERENCES
            ]
        );
    }

    #[tokio::test]
    async fn test_batch_with_configured_delimiter() {
        let h = Harness::with_config(ContractConfig {
            batch_error_delimiter: " ## ".to_string(),
            ..ContractConfig::default()
        });
        let items = vec![record("1").to_string(), record("2").to_string()];
        let resp = h.call("OrgA", "abp", items).await;
        assert_eq!(resp.payload_str().matches(" ## ").count(), 1);
    }

    #[tokio::test]
    async fn test_batch_aborts_on_unparseable_item() {
        let h = Harness::new();
        let items = vec![record("1111111111").to_string(), "[not an object]".to_string()];
        let resp = h.call("OrgA", "abp", items).await;
        assert_eq!(resp.status, Response::ERROR);
        assert!(resp.message.starts_with("batchPreferences : Serialization Error"));
    }

    // =========================================================================
    // FAILURE SURFACES
    // =========================================================================

    #[tokio::test]
    async fn test_ledger_outage_fails_fast() {
        let h = Harness::new();
        h.ledger.fail_reads(true);

        let resp = h.call("OrgA", "sp", arg(&record("9876543210"))).await;
        assert_eq!(resp.status, Response::ERROR);
        assert!(resp
            .message
            .starts_with("setPreferences : GetState Failed for MSISDN : 9876543210"));

        let resp = h
            .call("OrgA", "abp", vec![record("9876543210").to_string()])
            .await;
        assert!(resp.message.starts_with("batchPreferences : GetState Failed"));
        assert!(h.events.events().is_empty());
    }

    #[tokio::test]
    async fn test_query_outage_and_cursor_cleanup() {
        let h = Harness::new();
        for phone in ["1111111111", "2222222222", "3333333333"] {
            h.call("OrgA", "sp", arg(&record(phone))).await;
        }

        h.ledger.fail_query_steps(true);
        let resp = h
            .call("OrgA", "qp", args(&[r#"{"selector":{"obj":"Preferences"}}"#]))
            .await;
        assert_eq!(resp.status, Response::ERROR);
        assert!(resp.payload.is_empty());
        assert_eq!(h.ledger.open_cursors(), 0);

        h.ledger.fail_query_steps(false);
        h.ledger.fail_queries(true);
        let resp = h
            .call("OrgA", "qp", args(&[r#"{"selector":{"obj":"Preferences"}}"#]))
            .await;
        assert!(resp.message.starts_with("queryPreferences : GetQueryResult Failed"));
    }

    #[tokio::test]
    async fn test_missing_certificate() {
        let h = Harness::new();
        let identity = StaticIdentity::missing();
        let ctx = InvocationContext::new(TxId::new("tx-anon"), &identity);

        let resp = h
            .contract
            .invoke(&ctx, Invocation::new("sp", arg(&record("9876543210"))))
            .await;
        assert_eq!(resp.status, Response::ERROR);
        assert!(resp
            .message
            .starts_with("setPreferences : Getting certificate Details Error"));
        assert!(h.ledger.is_empty());

        // absent-record paths never consult the identity
        let resp = h
            .contract
            .invoke(&ctx, Invocation::new("dp", args(&["9876543210"])))
            .await;
        assert!(resp.is_ok());
    }

    #[tokio::test]
    async fn test_event_refusal_after_write() {
        let h = Harness::new();
        h.call("OrgA", "sp", arg(&record("9876543210"))).await;
        h.events.fail_emission(true);

        let resp = h.call("OrgA", "dp", args(&["9876543210"])).await;
        assert_eq!(resp.status, Response::ERROR);
        assert!(resp
            .message
            .contains("Event Creation Error for EventID : DELETE-PREFERENCES"));
        // no rollback
        assert!(h.stored("9876543210").is_none());
    }

    #[tokio::test]
    async fn test_batch_stops_at_event_refusal() {
        let h = Harness::new();
        h.events.fail_emission_after(2);
        let items: Vec<String> = ["1111111111", "2222222222", "3333333333", "4444444444"]
            .iter()
            .map(|p| record(p).to_string())
            .collect();

        let resp = h.call("OrgA", "abp", items).await;
        assert_eq!(resp.status, Response::ERROR);
        assert!(resp
            .message
            .starts_with("batchPreferences : Event Creation Error for EventID : ADD-PREFERENCES"));

        // no rollback for the item whose event was refused
        assert_eq!(h.ledger.keys(), vec!["1111111111", "2222222222", "3333333333"]);
        assert!(h.stored("4444444444").is_none());
        assert_eq!(h.events.events().len(), 2);
    }

    #[tokio::test]
    async fn test_batch_stops_at_write_failure() {
        let h = Harness::new();
        h.ledger.fail_writes_after(2);
        let items: Vec<String> = ["1111111111", "2222222222", "3333333333", "4444444444"]
            .iter()
            .map(|p| record(p).to_string())
            .collect();

        let resp = h.call("OrgA", "abp", items).await;
        assert_eq!(resp.status, Response::ERROR);
        assert!(resp
            .message
            .starts_with("batchPreferences : PutState Failed for MSISDN : 3333333333"));
        assert!(resp.payload.is_empty());

        assert_eq!(h.ledger.keys(), vec!["1111111111", "2222222222"]);
        assert_eq!(
            h.events.event_names(),
            vec![topics::ADD_PREFERENCES, topics::ADD_PREFERENCES]
        );
    }

    #[tokio::test]
    async fn test_function_names_are_case_sensitive() {
        let h = Harness::new();
        for name in ["DP", "Sp", "query", ""] {
            let resp = h.call("OrgA", name, Vec::new()).await;
            assert_eq!(resp.status, Response::ERROR);
            assert!(resp.message.contains("sp,abp,dp,po,qp"));
        }
    }
}
