//! # Lab Ledger Operations
//!
//! Store, query and update calls for the two lab contracts, issued through
//! one open gateway session.
//!
//! | Operation | Contract | Function | Kind |
//! |-----------|----------|----------|------|
//! | store / update test | chain | `StoreTest`, `UpdateTest` | submit |
//! | query tests | chain | `GetTestByID`, `GetTestsByLote` | evaluate |
//! | store model | chain | `StoreModel` | submit |
//! | store / query spreadsheet | chain | `StorePlanilha`, `GetPlanilhaByHash`, `GetPlanilhasByLote` | submit / evaluate |
//! | store / query image | image | `StoreImage`, `GetImageByID`, `GetImagesByKit` | submit / evaluate |
//!
//! Queries return `Ok(None)` when the ledger holds nothing for the key. A
//! contract error whose message reports a missing key counts as nothing
//! found, not as a failure.

use crate::config::LedgerProfile;
use crate::errors::LabError;
use serde_json::Value;
use sl_03_transaction_gateway::{Contract, GatewayError, GatewaySession, SubmittedTransaction};
use sl_04_response_codec::decode;
use sl_05_record_encoder::encode_features;
use sl_06_content_addressing::{digest, ContentDigest, ModelArtifact};
use sl_07_partial_update::{apply_field_update, coerce_value};
use tracing::{debug, info};

/// Record fields accepted as the test identifier, in priority order.
pub const TEST_ID_FIELDS: [&str; 3] = ["test_id", "testID", "TestID"];

/// Phrases contracts use when a key is absent.
const NOT_FOUND_MARKERS: [&str; 3] = ["not found", "não encontrad", "nao encontrad"];

/// Result of storing one test record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredTest {
    pub index: usize,
    pub test_id: String,
    pub transaction_id: String,
}

/// Identifier of a test record: its own id field, else `fallback`.
pub fn resolve_test_id(record: &Value, fallback: Option<&str>) -> Option<String> {
    TEST_ID_FIELDS
        .iter()
        .find_map(|field| match record.get(field) {
            Some(Value::String(id)) if !id.is_empty() => Some(id.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        })
        .or_else(|| fallback.filter(|id| !id.is_empty()).map(str::to_string))
}

/// Lab operations over one gateway session.
#[derive(Debug, Clone)]
pub struct LabLedger<'a> {
    session: &'a GatewaySession<'a>,
    profile: &'a LedgerProfile,
}

impl<'a> LabLedger<'a> {
    pub fn new(session: &'a GatewaySession<'a>, profile: &'a LedgerProfile) -> Self {
        Self { session, profile }
    }

    fn chain(&self) -> Contract<'a> {
        self.session
            .ledger(&self.profile.channel_name)
            .contract(&self.profile.chain_contract)
    }

    fn images(&self) -> Contract<'a> {
        self.session
            .ledger(&self.profile.channel_name)
            .contract(&self.profile.image_contract)
    }

    // =========================================================================
    // TESTS
    // =========================================================================

    /// Store one test record with its feature vector.
    ///
    /// The stored JSON and the vector are derived from the same snapshot.
    pub async fn store_test(&self, test_id: &str, record: &Value) -> Result<SubmittedTransaction, LabError> {
        let mut snapshot = record.clone();
        if let Value::Object(fields) = &mut snapshot {
            fields.insert("test_id".into(), Value::String(test_id.to_string()));
        }
        let features = encode_features(&snapshot)?.to_string();
        let json = snapshot.to_string();

        debug!(test_id, features = %features, "Storing test");
        let committed = self.chain().submit("StoreTest", &[test_id, &json, &features]).await?;
        info!(test_id, tx_id = %committed.transaction_id, "Test stored");
        Ok(committed)
    }

    /// Store a batch of records. Every identifier is resolved before the
    /// first submit; storing stops at the first ledger failure.
    pub async fn store_tests(&self, items: &[Value], fallback_id: Option<&str>) -> Result<Vec<StoredTest>, LabError> {
        let ids = items
            .iter()
            .enumerate()
            .map(|(index, item)| resolve_test_id(item, fallback_id).ok_or(LabError::MissingTestId { index }))
            .collect::<Result<Vec<_>, _>>()?;

        let mut stored = Vec::with_capacity(items.len());
        for (index, (item, test_id)) in items.iter().zip(ids).enumerate() {
            let committed = self.store_test(&test_id, item).await?;
            stored.push(StoredTest {
                index,
                test_id,
                transaction_id: committed.transaction_id,
            });
        }
        Ok(stored)
    }

    /// Replace a test record wholesale. Fails with
    /// [`LabError::TestNotFound`] when the contract has no such test.
    pub async fn update_test(&self, test_id: &str, record: &Value) -> Result<SubmittedTransaction, LabError> {
        let json = record.to_string();
        let committed = self
            .chain()
            .submit("UpdateTest", &[test_id, &json])
            .await
            .map_err(|err| match err {
                GatewayError::Transaction { ref diagnostic, .. } if reports_missing(diagnostic) => {
                    LabError::TestNotFound {
                        test_id: test_id.to_string(),
                    }
                }
                other => other.into(),
            })?;
        info!(test_id, tx_id = %committed.transaction_id, "Test updated");
        Ok(committed)
    }

    pub async fn query_test_by_id(&self, test_id: &str) -> Result<Option<Value>, LabError> {
        read(&self.chain(), "GetTestByID", &[test_id]).await
    }

    pub async fn query_tests_by_lote(&self, lote: &str) -> Result<Option<Value>, LabError> {
        read(&self.chain(), "GetTestsByLote", &[lote]).await
    }

    /// Edit one field of a committed test and resubmit it.
    ///
    /// `raw_value` is coerced (`"true"` → boolean, numeric text → number).
    /// Returns the record as submitted.
    pub async fn edit_test_field(&self, test_id: &str, field_path: &str, raw_value: &str) -> Result<Value, LabError> {
        let mut record = self
            .query_test_by_id(test_id)
            .await?
            .ok_or_else(|| LabError::TestNotFound {
                test_id: test_id.to_string(),
            })?;

        apply_field_update(&mut record, field_path, coerce_value(raw_value))?;
        self.update_test(test_id, &record).await?;
        Ok(record)
    }

    // =========================================================================
    // MODELS
    // =========================================================================

    pub async fn store_model(&self, artifact: &ModelArtifact) -> Result<SubmittedTransaction, LabError> {
        let committed = self
            .chain()
            .submit("StoreModel", &[&artifact.key, &artifact.payload])
            .await?;
        info!(model_key = %artifact.key, tx_id = %committed.transaction_id, "Model stored");
        Ok(committed)
    }

    // =========================================================================
    // IMAGES
    // =========================================================================

    /// Digest the image locally and record the digest under `kit_id`.
    pub async fn store_image(&self, kit_id: &str, image: &[u8]) -> Result<ContentDigest, LabError> {
        let image_digest = digest(image);
        let hex = image_digest.to_hex();
        self.images().submit("StoreImage", &[kit_id, &hex]).await?;
        info!(kit_id, digest = %hex, bytes = image.len(), "Image stored");
        Ok(image_digest)
    }

    pub async fn query_image_by_hash(&self, image_digest: &ContentDigest) -> Result<Option<Value>, LabError> {
        read(&self.images(), "GetImageByID", &[&image_digest.to_hex()]).await
    }

    pub async fn query_images_by_kit(&self, kit_id: &str) -> Result<Option<Value>, LabError> {
        read(&self.images(), "GetImagesByKit", &[kit_id]).await
    }

    // =========================================================================
    // SPREADSHEETS
    // =========================================================================

    /// Record an already computed spreadsheet digest under `lote`.
    pub async fn store_planilha(&self, lote: &str, planilha_digest: &ContentDigest) -> Result<SubmittedTransaction, LabError> {
        let hex = planilha_digest.to_hex();
        let committed = self.chain().submit("StorePlanilha", &[lote, &hex]).await?;
        info!(lote, digest = %hex, "Spreadsheet stored");
        Ok(committed)
    }

    /// Digest the spreadsheet locally, then record it.
    pub async fn store_planilha_bytes(&self, lote: &str, planilha: &[u8]) -> Result<ContentDigest, LabError> {
        let planilha_digest = digest(planilha);
        self.store_planilha(lote, &planilha_digest).await?;
        Ok(planilha_digest)
    }

    pub async fn query_planilha_by_hash(&self, planilha_digest: &ContentDigest) -> Result<Option<Value>, LabError> {
        read(&self.chain(), "GetPlanilhaByHash", &[&planilha_digest.to_hex()]).await
    }

    pub async fn query_planilhas_by_lote(&self, lote: &str) -> Result<Option<Value>, LabError> {
        read(&self.chain(), "GetPlanilhasByLote", &[lote]).await
    }
}

async fn read(contract: &Contract<'_>, function: &str, args: &[&str]) -> Result<Option<Value>, LabError> {
    match contract.evaluate(function, args).await {
        Ok(raw) => Ok(decode(&raw)?.filter(|value| !value.is_null())),
        Err(GatewayError::Transaction { diagnostic, .. }) if reports_missing(&diagnostic) => {
            debug!(function, diagnostic = %diagnostic, "Nothing found");
            Ok(None)
        }
        Err(err) => Err(err.into()),
    }
}

fn reports_missing(diagnostic: &str) -> bool {
    let lowered = diagnostic.to_lowercase();
    NOT_FOUND_MARKERS.iter().any(|marker| lowered.contains(marker))
}
