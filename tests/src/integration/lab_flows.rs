//! # Lab Ledger Flows
//!
//! Record lifecycles through `LedgerConnector` scopes, checked against the
//! committed world state of the simulated network.

#[cfg(test)]
mod tests {
    use p256::ecdsa::SigningKey;
    use p256::pkcs8::{EncodePrivateKey, LineEnding};
    use serde_json::{json, Value};
    use sl_01_identity_store::{load_identity, load_signer, CredentialSelection};
    use sl_03_transaction_gateway::InMemoryLedger;
    use sl_04_response_codec::decode;
    use sl_06_content_addressing::{digest, encode_model};
    use sl_08_lab_ledger::{
        simulated_network, CredentialSource, LabError, LedgerConnector, LedgerProfile, TransportSource,
    };
    use std::sync::Arc;

    // =============================================================================
    // FIXTURES
    // =============================================================================

    fn connector() -> (LedgerConnector, Arc<InMemoryLedger>) {
        let profile = LedgerProfile::default();
        let ledger = Arc::new(simulated_network(&profile));
        (LedgerConnector::in_memory(profile, ledger.clone()), ledger)
    }

    fn record(lot: &str) -> Value {
        json!({
            "cassette_lot": lot,
            "sample_pH": 7.2,
            "sample_turbidity": 3,
            "controle_interno_result": "valid",
            "operator_id": "op-7"
        })
    }

    fn committed(ledger: &InMemoryLedger, contract: &str, key: &str) -> Option<Value> {
        let profile = LedgerProfile::default();
        let state = ledger.world_state(&profile.channel_name, contract);
        state.get(key).and_then(|raw| decode(raw).unwrap())
    }

    // =============================================================================
    // TEST RECORDS
    // =============================================================================

    #[tokio::test]
    async fn test_record_lifecycle_moves_lot_index() {
        let (connector, ledger) = connector();
        let chain = connector.profile().chain_contract.clone();

        let items = vec![
            json!({"test_id": "T-1", "cassette_lot": "L1"}),
            json!({"testID": "T-2", "cassette_lot": "L1"}),
        ];
        connector
            .with_ledger(|lab| Box::pin(async move { lab.store_tests(&items, None).await }))
            .await
            .unwrap();

        let edited = connector
            .with_ledger(|lab| Box::pin(async move { lab.edit_test_field("T-2", "cassette_lot", "L2").await }))
            .await
            .unwrap();
        assert_eq!(edited["cassette_lot"], "L2");

        let (l1, l2) = connector
            .with_ledger(|lab| {
                Box::pin(async move {
                    let l1 = lab.query_tests_by_lote("L1").await?;
                    let l2 = lab.query_tests_by_lote("L2").await?;
                    Ok::<_, LabError>((l1, l2))
                })
            })
            .await
            .unwrap();
        assert_eq!(l1.unwrap().as_array().map(Vec::len), Some(1));
        assert_eq!(l2.unwrap()[0]["test_id"], "T-2");

        let stored = committed(&ledger, &chain, "T-2").unwrap();
        assert_eq!(stored["version"], 1);
        assert_eq!(ledger.block_height(), 3);
    }

    #[tokio::test]
    async fn test_nested_field_edit_coerces_value() {
        let (connector, _) = connector();
        let mut initial = record("L1");
        initial["readings"] = json!({"line_c": {"intensity": 10}});

        connector
            .with_ledger(move |lab| Box::pin(async move { lab.store_test("T-9", &initial).await }))
            .await
            .unwrap();

        let edited = connector
            .with_ledger(|lab| {
                Box::pin(async move { lab.edit_test_field("T-9", "readings.line_c.intensity", "12.5").await })
            })
            .await
            .unwrap();
        assert_eq!(edited["readings"]["line_c"]["intensity"], 12.5);

        let flagged = connector
            .with_ledger(|lab| Box::pin(async move { lab.edit_test_field("T-9", "reviewed", "true").await }))
            .await
            .unwrap();
        assert_eq!(flagged["reviewed"], true);
        assert_eq!(flagged["readings"]["line_c"]["intensity"], 12.5);
    }

    #[tokio::test]
    async fn test_record_with_comma_values_is_stored() {
        let (connector, _) = connector();
        let mut odd = record("L1");
        odd["sample_pH"] = json!("7,2");
        odd["tilt_deg"] = json!([1, 2]);

        connector
            .with_ledger(move |lab| Box::pin(async move { lab.store_test("T-7", &odd).await }))
            .await
            .unwrap();

        let stored = connector
            .with_ledger(|lab| Box::pin(async move { lab.query_test_by_id("T-7").await }))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored["sample_pH"], "7,2");
        assert_eq!(stored["tilt_deg"], json!([1, 2]));
    }

    #[tokio::test]
    async fn test_duplicate_store_is_rejected_by_contract() {
        let (connector, ledger) = connector();
        connector
            .with_ledger(|lab| Box::pin(async move { lab.store_test("T-1", &record("L1")).await }))
            .await
            .unwrap();

        let err = connector
            .with_ledger(|lab| Box::pin(async move { lab.store_test("T-1", &record("L1")).await }))
            .await
            .unwrap_err();
        assert!(matches!(err, LabError::Gateway(_)));
        assert!(!err.is_not_found());
        assert_eq!(ledger.block_height(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_scopes_share_one_network() {
        let (connector, ledger) = connector();

        let stores = (0..8).map(|i| {
            let connector = connector.clone();
            tokio::spawn(async move {
                let test_id = format!("T-{i}");
                connector
                    .with_ledger(move |lab| Box::pin(async move { lab.store_test(&test_id, &record("L9")).await }))
                    .await
            })
        });
        for handle in futures::future::join_all(stores).await {
            handle.unwrap().unwrap();
        }

        let by_lot = connector
            .with_ledger(|lab| Box::pin(async move { lab.query_tests_by_lote("L9").await }))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_lot.as_array().map(Vec::len), Some(8));
        assert_eq!(ledger.block_height(), 8);
    }

    // =============================================================================
    // CONTENT-ADDRESSED ASSETS
    // =============================================================================

    #[tokio::test]
    async fn test_planilha_bytes_and_digest_address_same_asset() {
        let (connector, _) = connector();
        let sheet = b"lote;resultado\nL1;ok\n".to_vec();
        let expected = digest(&sheet);

        let lookup = expected.clone();
        let (stored, asset, by_lot) = connector
            .with_ledger(move |lab| {
                Box::pin(async move {
                    let stored = lab.store_planilha_bytes("L1", &sheet).await?;
                    lab.store_planilha("L1", &stored).await?;
                    let asset = lab.query_planilha_by_hash(&lookup).await?;
                    let by_lot = lab.query_planilhas_by_lote("L1").await?;
                    Ok::<_, LabError>((stored, asset, by_lot))
                })
            })
            .await
            .unwrap();

        assert_eq!(stored, expected);
        let asset = asset.unwrap();
        assert_eq!(asset["hash_planilha"], expected.to_hex());
        assert_eq!(asset["version"], 1);
        assert_eq!(by_lot.unwrap().as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn test_images_grouped_by_kit() {
        let (connector, _) = connector();
        let (a, b) = connector
            .with_ledger(|lab| {
                Box::pin(async move {
                    let a = lab.store_image("KIT-1", b"front").await?;
                    let b = lab.store_image("KIT-1", b"back").await?;
                    lab.store_image("KIT-2", b"other").await?;
                    Ok::<_, LabError>((a, b))
                })
            })
            .await
            .unwrap();
        assert_ne!(a, b);

        let kit = connector
            .with_ledger(|lab| Box::pin(async move { lab.query_images_by_kit("KIT-1").await }))
            .await
            .unwrap()
            .unwrap();
        let hashes: Vec<&str> = kit
            .as_array()
            .unwrap()
            .iter()
            .filter_map(|asset| asset["hashData"].as_str())
            .collect();
        assert_eq!(hashes.len(), 2);
        assert!(hashes.contains(&a.to_hex().as_str()));
        assert!(hashes.contains(&b.to_hex().as_str()));
    }

    #[tokio::test]
    async fn test_model_versions_increment() {
        let (connector, ledger) = connector();
        let chain = connector.profile().chain_contract.clone();
        let first = encode_model("qc_status", b"weights-v1").unwrap();
        let second = encode_model("qc_status", b"weights-v2").unwrap();

        connector
            .with_ledger(move |lab| {
                Box::pin(async move {
                    lab.store_model(&first).await?;
                    lab.store_model(&second).await
                })
            })
            .await
            .unwrap();

        let model = committed(&ledger, &chain, "qc_status").unwrap();
        assert_eq!(model["version"], 2);
        assert_eq!(model["modelKey"], "qc_status");
    }

    // =============================================================================
    // CREDENTIALS
    // =============================================================================

    #[tokio::test]
    async fn test_fixed_credentials_loaded_from_msp_layout() {
        let msp = tempfile::tempdir().unwrap();
        let (certs, keys) = (msp.path().join("signcerts"), msp.path().join("keystore"));
        std::fs::create_dir_all(&certs).unwrap();
        std::fs::create_dir_all(&keys).unwrap();
        std::fs::write(certs.join("cert.pem"), b"-----BEGIN CERTIFICATE-----\n").unwrap();
        let key = SigningKey::random(&mut rand::rngs::OsRng);
        std::fs::write(keys.join("priv_sk"), key.to_pkcs8_pem(LineEnding::LF).unwrap().as_bytes()).unwrap();

        let identity = load_identity("org1MSP", &certs, CredentialSelection::RequireSingle).unwrap();
        let signer = load_signer(&keys, CredentialSelection::RequireSingle).unwrap();
        assert_eq!(&signer.verifying_key(), key.verifying_key());

        let profile = LedgerProfile::default();
        let ledger = Arc::new(simulated_network(&profile));
        let connector = LedgerConnector::new(
            profile,
            TransportSource::InMemory(ledger.clone()),
            CredentialSource::Fixed { identity, signer },
        );
        connector
            .with_ledger(|lab| Box::pin(async move { lab.store_test("T-1", &record("L1")).await }))
            .await
            .unwrap();
        assert_eq!(ledger.block_height(), 1);
    }
}
