//! # Gateway Flows
//!
//! Transaction gateway sessions driven directly against the simulated
//! contracts, with results read back through the response codec.

#[cfg(test)]
mod tests {
    use serde_json::json;
    use sl_01_identity_store::{Identity, Signer};
    use sl_02_secure_channel::{open_channel, ChannelError};
    use sl_03_transaction_gateway::{open_session, GatewayError, HashAlgorithm, InMemoryLedger};
    use sl_04_response_codec::{decode, hash_data};
    use sl_05_record_encoder::{encode_features, FeatureVector, FEATURE_COUNT};
    use sl_06_content_addressing::digest;
    use sl_07_partial_update::{apply_field_update, coerce_value};
    use sl_08_lab_ledger::{simulated_network, LedgerProfile};

    // =============================================================================
    // FIXTURES
    // =============================================================================

    fn network() -> (LedgerProfile, InMemoryLedger) {
        let profile = LedgerProfile::default();
        let network = simulated_network(&profile);
        (profile, network)
    }

    fn identity() -> Identity {
        Identity::new("org1MSP", b"-----BEGIN CERTIFICATE-----\n".to_vec())
    }

    // =============================================================================
    // SUBMIT / EVALUATE
    // =============================================================================

    #[tokio::test]
    async fn test_submit_then_evaluate_observes_write() {
        let (profile, network) = network();
        let session = open_session(identity(), Signer::generate(), &network, HashAlgorithm::Sha256);
        let images = session.ledger(&profile.channel_name).contract(&profile.image_contract);

        let hex = digest(b"strip photo").to_hex();
        let committed = images.submit("StoreImage", &["KIT-1", hex.as_str()]).await.unwrap();
        assert_eq!(committed.block_number, 1);
        assert!(committed.result.is_empty());

        let raw = images.evaluate("GetImageByID", &[hex.as_str()]).await.unwrap();
        let asset = decode(&raw).unwrap().unwrap();
        assert_eq!(hash_data(&asset), Some(hex.as_str()));
        assert_eq!(asset["idKit"], "KIT-1");

        session.close().unwrap();
    }

    #[tokio::test]
    async fn test_submits_apply_in_issue_order() {
        let (profile, network) = network();
        let session = open_session(identity(), Signer::generate(), &network, HashAlgorithm::Sha384);
        let chain = session.ledger(&profile.channel_name).contract(&profile.chain_contract);

        let first = chain.submit("StoreModel", &["qc_status", "AAEC"]).await.unwrap();
        let second = chain.submit("StoreModel", &["qc_status", "AAED"]).await.unwrap();
        assert!(second.block_number > first.block_number);

        let state = network.world_state(&profile.channel_name, &profile.chain_contract);
        let model = decode(state.get("qc_status").unwrap()).unwrap().unwrap();
        assert_eq!(model["version"], 2);
        assert_eq!(model["modelData"], "AAED");
    }

    #[tokio::test]
    async fn test_evaluate_does_not_write() {
        let (profile, network) = network();
        let session = open_session(identity(), Signer::generate(), &network, HashAlgorithm::Sha3_256);
        let images = session.ledger(&profile.channel_name).contract(&profile.image_contract);

        images.evaluate("StoreImage", &["KIT-1", "ab"]).await.unwrap();
        assert_eq!(network.block_height(), 0);
        assert!(network
            .world_state(&profile.channel_name, &profile.image_contract)
            .is_empty());
    }

    #[tokio::test]
    async fn test_chaincode_rejection_is_transaction_error() {
        let (profile, network) = network();
        let session = open_session(identity(), Signer::generate(), &network, HashAlgorithm::Sha256);
        let chain = session.ledger(&profile.channel_name).contract(&profile.chain_contract);

        let err = chain.submit("StoreModel", &["unknown", "AAEC"]).await.unwrap_err();
        match err {
            GatewayError::Transaction { function, diagnostic, .. } => {
                assert_eq!(function, "StoreModel");
                assert!(diagnostic.contains("modelKey"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!GatewayError::SessionClosed.is_retryable());
    }

    #[tokio::test]
    async fn test_closed_session_rejects_calls() {
        let (profile, network) = network();
        let session = open_session(identity(), Signer::generate(), &network, HashAlgorithm::Sha256);
        session.close().unwrap();

        let images = session.ledger(&profile.channel_name).contract(&profile.image_contract);
        let err = images.evaluate("GetImagesByKit", &["KIT-1"]).await.unwrap_err();
        assert!(matches!(err, GatewayError::SessionClosed));
        assert!(matches!(session.close(), Err(GatewayError::SessionClosed)));
    }

    #[tokio::test]
    async fn test_channel_rejects_invalid_root_before_dialling() {
        let err = open_channel("localhost:7051", "peer0.org1.example.com", b"not pem")
            .await
            .unwrap_err();
        assert_eq!(err, ChannelError::InvalidRootCertificate);
    }

    // =============================================================================
    // RECORD PIPELINE
    // =============================================================================

    #[tokio::test]
    async fn test_stored_record_survives_patch_and_resubmit() {
        let (profile, network) = network();
        let session = open_session(identity(), Signer::generate(), &network, HashAlgorithm::Sha256);
        let chain = session.ledger(&profile.channel_name).contract(&profile.chain_contract);

        let record = json!({"test_id": "T-1", "cassette_lot": "L1", "sample_pH": 7.0});
        let features = encode_features(&record).unwrap().to_string();
        assert_eq!(FeatureVector::parse(&features).unwrap().fields().len(), FEATURE_COUNT);
        chain
            .submit("StoreTest", &["T-1", &record.to_string(), &features])
            .await
            .unwrap();

        let raw = chain.evaluate("GetTestByID", &["T-1"]).await.unwrap();
        let mut stored = decode(&raw).unwrap().unwrap();
        apply_field_update(&mut stored, "sample_pH", coerce_value("6.8")).unwrap();
        chain
            .submit("UpdateTest", &["T-1", &stored.to_string()])
            .await
            .unwrap();

        let raw = chain.evaluate("GetTestByID", &["T-1"]).await.unwrap();
        let updated = decode(&raw).unwrap().unwrap();
        assert_eq!(updated["sample_pH"], 6.8);
        assert_eq!(updated["version"], 1);
        assert_eq!(updated["created_at"], stored["created_at"]);
    }
}
