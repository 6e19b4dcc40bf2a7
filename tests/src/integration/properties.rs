//! # Randomized Invariant Sweeps
//!
//! Seeded random inputs checked against the contract's invariants:
//!
//! - malformed numbers never reach world-state
//! - a batch with M bad items yields exactly M error entries
//! - port-out only touches the provider and update timestamp
//! - a query returns exactly the matching records
//! - foreign organizations never change a record

#[cfg(test)]
mod tests {
    use crate::integration::fixtures::{arg, args, record, Harness};
    use cpm_preferences::prelude::*;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::{Rng, SeedableRng};
    use serde_json::{json, Value};

    const SEED: u64 = 0x00C0_FFEE;
    const ROUNDS: usize = 50;

    fn numeric(rng: &mut StdRng, len: usize) -> String {
        (0..len)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect()
    }

    /// A number of acceptable length with one character replaced by a non-digit.
    fn non_numeric(rng: &mut StdRng) -> String {
        let len = rng.gen_range(10..16);
        let mut chars: Vec<char> = numeric(rng, len).chars().collect();
        let at = rng.gen_range(0..chars.len());
        chars[at] = *['a', 'Z', '-', '+', ' ', '.', '#'].choose(rng).unwrap_or(&'x');
        chars.into_iter().collect()
    }

    fn short_number(rng: &mut StdRng) -> String {
        let len = rng.gen_range(1..DEFAULT_MIN_MSISDN_LENGTH);
        numeric(rng, len)
    }

    // =========================================================================
    // FORMAT REJECTION
    // =========================================================================

    #[tokio::test]
    async fn test_bad_numbers_never_persist() {
        let mut rng = StdRng::seed_from_u64(SEED);
        let h = Harness::new();

        for _ in 0..ROUNDS {
            let mut rec = record(&numeric(&mut rng, 10));
            match rng.gen_range(0..3) {
                0 => rec["msisdn"] = json!(non_numeric(&mut rng)),
                1 => rec["msisdn"] = json!(short_number(&mut rng)),
                _ => rec["lrn"] = json!(non_numeric(&mut rng)),
            }

            let resp = h.call("OrgA", "sp", arg(&rec)).await;
            assert_eq!(resp.status, Response::ERROR, "accepted {rec}");
            assert!(resp.message.starts_with(r#"{"Error":"#), "{}", resp.message);

            let resp = h.call("OrgA", "abp", arg(&rec)).await;
            assert!(resp.is_ok());
            assert!(resp
                .payload_str()
                .starts_with("batchPreferences : Updating batch Error : "));
        }

        assert!(h.ledger.is_empty());
        assert!(h.events.events().is_empty());
    }

    #[tokio::test]
    async fn test_valid_numbers_of_any_length_are_accepted() {
        let mut rng = StdRng::seed_from_u64(SEED ^ 1);
        let h = Harness::new();

        for _ in 0..ROUNDS {
            let len = rng.gen_range(DEFAULT_MIN_MSISDN_LENGTH..40);
            let phone = numeric(&mut rng, len);
            let mut rec = record(&phone);
            let lrn_len = rng.gen_range(1..12);
            rec["lrn"] = json!(numeric(&mut rng, lrn_len));

            let resp = h.call("OrgA", "sp", arg(&rec)).await;
            assert!(resp.is_ok(), "{phone}: {}", resp.message);
            assert_eq!(h.stored(&phone).unwrap()["lrn"], rec["lrn"]);
        }
    }

    // =========================================================================
    // BATCH ACCOUNTING
    // =========================================================================

    #[tokio::test]
    async fn test_batch_error_count_matches_bad_items() {
        let mut rng = StdRng::seed_from_u64(SEED ^ 2);

        for _ in 0..10 {
            let h = Harness::new();
            let total = rng.gen_range(1..25);
            let mut bad = 0;
            let mut good_phones = Vec::new();
            let mut items = Vec::new();

            for i in 0..total {
                // index suffix keeps numbers distinct
                let phone = format!("{}{i:04}", numeric(&mut rng, 8));
                let mut rec = record(&phone);
                if rng.gen_bool(0.3) {
                    bad += 1;
                    if rng.gen_bool(0.5) {
                        rec["msisdn"] = json!(non_numeric(&mut rng));
                    } else {
                        rec.as_object_mut().unwrap().remove("day");
                    }
                } else {
                    good_phones.push(phone);
                }
                items.push(rec.to_string());
            }

            let resp = h.call("OrgA", "abp", items).await;
            assert!(resp.is_ok());
            let text = resp.payload_str().into_owned();

            if bad == 0 {
                assert!(text.contains("Batch Preferences data added Successfully"));
            } else {
                let body = text
                    .strip_prefix("batchPreferences : Updating batch Error : ")
                    .unwrap();
                assert_eq!(body.split('|').count(), bad, "{text}");
            }
            assert_eq!(h.ledger.len(), good_phones.len());
            assert_eq!(h.events.events().len(), good_phones.len());
            for phone in &good_phones {
                assert!(h.stored(phone).is_some());
            }
        }
    }

    // =========================================================================
    // PORT-OUT
    // =========================================================================

    #[tokio::test]
    async fn test_port_out_touches_only_provider_and_timestamp() {
        let mut rng = StdRng::seed_from_u64(SEED ^ 3);
        let h = Harness::new();

        for _ in 0..ROUNDS {
            let phone = numeric(&mut rng, 10);
            h.call("OrgA", "sp", arg(&record(&phone))).await;
            let before = h.stored(&phone).unwrap();

            let provider = format!("P{}", rng.gen_range(0..1000));
            let ts = format!("2021-{:02}-01T00:00:00Z", rng.gen_range(1..13));
            let resp = h.call("OrgA", "po", args(&[phone.as_str(), provider.as_str(), ts.as_str()])).await;
            assert!(resp.is_ok(), "{}", resp.message);

            let mut expected = before.clone();
            expected["svcprv"] = json!(provider);
            expected["uts"] = json!(ts);
            assert_eq!(h.stored(&phone).unwrap(), expected);
        }
    }

    // =========================================================================
    // QUERY
    // =========================================================================

    #[tokio::test]
    async fn test_query_returns_exactly_the_matches() {
        let mut rng = StdRng::seed_from_u64(SEED ^ 4);
        let providers = ["P1", "P2", "P3"];

        for _ in 0..10 {
            let h = Harness::new();
            let mut expected = 0;
            let target = *providers.choose(&mut rng).unwrap();

            for i in 0..rng.gen_range(0..20) {
                let phone = format!("98765{i:05}");
                let provider = *providers.choose(&mut rng).unwrap();
                let mut rec = record(&phone);
                rec["svcprv"] = json!(provider);
                h.call("OrgA", "sp", arg(&rec)).await;
                if provider == target {
                    expected += 1;
                }
            }

            let selector = json!({ "selector": { "svcprv": target } }).to_string();
            let resp = h.call("OrgA", "qp", args(&[selector.as_str()])).await;
            assert!(resp.is_ok(), "{}", resp.message);

            let rows: Vec<Value> = serde_json::from_slice(&resp.payload).unwrap();
            assert_eq!(rows.len(), expected);
            if expected == 0 {
                assert_eq!(resp.payload_str(), "[]");
            }
            for row in rows {
                assert_eq!(row["Record"]["svcprv"], target);
                assert_eq!(row["Key"], row["Record"]["msisdn"]);
            }
            assert_eq!(h.ledger.open_cursors(), 0);
        }
    }

    // =========================================================================
    // OWNERSHIP
    // =========================================================================

    #[tokio::test]
    async fn test_foreign_orgs_never_mutate() {
        let mut rng = StdRng::seed_from_u64(SEED ^ 5);
        let h = Harness::new();
        let phones: Vec<String> = (0..10).map(|_| numeric(&mut rng, 10)).collect();
        for phone in &phones {
            h.call("OrgA", "sp", arg(&record(phone))).await;
        }
        let snapshot: Vec<Option<Value>> = phones.iter().map(|p| h.stored(p)).collect();
        let events_before = h.events.events().len();

        for _ in 0..ROUNDS {
            let phone = phones.choose(&mut rng).unwrap();
            let org = format!("Org{}", rng.gen_range(1..100));
            let resp = match rng.gen_range(0..4) {
                0 => {
                    let mut rec = record(phone);
                    rec["cmode"] = json!("SMS");
                    h.call(&org, "sp", arg(&rec)).await
                }
                1 => h.call(&org, "dp", args(&[phone.as_str()])).await,
                2 => h.call(&org, "po", args(&[phone.as_str(), "PX", "ts"])).await,
                _ => {
                    let resp = h.call(&org, "abp", arg(&record(phone))).await;
                    assert!(resp.payload_str().contains("Unauthorized Access"));
                    continue;
                }
            };
            assert_eq!(resp.message, "Unauthorized Access");
        }

        let after: Vec<Option<Value>> = phones.iter().map(|p| h.stored(p)).collect();
        assert_eq!(snapshot, after);
        assert_eq!(h.events.events().len(), events_before);
    }
}
