//! # Simulated Lab Contracts
//!
//! `sollytch-chain` and `sollytch-image` behaviour hosted on an
//! [`InMemoryLedger`], for local runs without a Fabric network and for tests.
//!
//! State layout follows the deployed contracts:
//!
//! | Record | Primary key | Index (composite key) |
//! |--------|-------------|-----------------------|
//! | test | test id | `lote~teste` (lot, test id) |
//! | spreadsheet | digest hex | `lote~planilha` (lot, digest) |
//! | model | model key | none |
//! | image | digest hex | `kit~hashImagem` (kit, digest) |
//!
//! Model inference is not simulated: stored tests keep whatever prediction
//! fields the caller sent.

use crate::config::LedgerProfile;
use serde_json::{json, Map, Value};
use sl_03_transaction_gateway::{ChaincodeLogic, InMemoryLedger, Invocation, WorldState};
use sl_05_record_encoder::FeatureVector;
use sl_06_content_addressing::KNOWN_MODEL_KEYS;

const TEST_BY_LOT: &str = "lote~teste";
const PLANILHA_BY_LOT: &str = "lote~planilha";
const IMAGE_BY_KIT: &str = "kit~hashImagem";
const INDEX_MARKER: u8 = 0x00;

/// Fabric composite key: `\0type\0attr1\0attr2\0`.
pub fn composite_key(object_type: &str, attributes: &[&str]) -> String {
    let mut key = format!("\u{0}{object_type}\u{0}");
    for attribute in attributes {
        key.push_str(attribute);
        key.push('\u{0}');
    }
    key
}

/// Last attribute of a composite key.
fn last_attribute(key: &str) -> Option<&str> {
    key.trim_end_matches('\u{0}').rsplit('\u{0}').next()
}

/// Primary keys listed under `object_type` / `attribute`, in key order.
fn indexed_keys(state: &WorldState, object_type: &str, attribute: &str) -> Vec<String> {
    let prefix = composite_key(object_type, &[attribute]);
    state
        .scan_prefix(&prefix)
        .filter_map(|(key, _)| last_attribute(key).map(str::to_string))
        .collect()
}

fn load_object(state: &WorldState, key: &str) -> Result<Option<Map<String, Value>>, String> {
    match state.get(key) {
        None => Ok(None),
        Some(bytes) => match serde_json::from_slice(bytes) {
            Ok(Value::Object(fields)) => Ok(Some(fields)),
            Ok(_) => Err(format!("record {key} is not a JSON object")),
            Err(e) => Err(format!("record {key} is corrupt: {e}")),
        },
    }
}

fn save(state: &mut WorldState, key: &str, record: &Map<String, Value>) -> Result<(), String> {
    let bytes = serde_json::to_vec(record).map_err(|e| e.to_string())?;
    state.put(key, bytes);
    Ok(())
}

fn version_of(record: &Map<String, Value>) -> i64 {
    record.get("version").and_then(Value::as_i64).unwrap_or(0)
}

fn required<'a>(value: &'a str, name: &str) -> Result<&'a str, String> {
    if value.is_empty() {
        Err(format!("{name} must not be empty"))
    } else {
        Ok(value)
    }
}

/// Serialize a list; an empty list is reported as `null`.
fn list(records: Vec<Map<String, Value>>) -> Result<Vec<u8>, String> {
    if records.is_empty() {
        return Ok(b"null".to_vec());
    }
    serde_json::to_vec(&records).map_err(|e| e.to_string())
}

fn object(record: &Map<String, Value>) -> Result<Vec<u8>, String> {
    serde_json::to_vec(record).map_err(|e| e.to_string())
}

/// Tests, models and spreadsheets.
#[derive(Debug, Default, Clone, Copy)]
pub struct SollytchChainContract;

impl SollytchChainContract {
    fn store_test(state: &mut WorldState, call: Invocation<'_>, test_id: &str, json: &str, features: &str) -> Result<(), String> {
        required(test_id, "testID")?;
        if state.get(test_id).is_some() {
            return Err(format!("test {test_id} already exists"));
        }
        let mut record = match serde_json::from_str::<Value>(json) {
            Ok(Value::Object(fields)) => fields,
            Ok(_) => return Err("test record must be a JSON object".into()),
            Err(e) => return Err(format!("invalid test JSON: {e}")),
        };
        FeatureVector::parse(features).map_err(|e| format!("invalid feature vector: {e}"))?;

        record.insert("test_id".into(), json!(test_id));
        record.insert("version".into(), json!(0));
        record.insert("created_at".into(), json!(call.timestamp));
        record.insert("last_updated_at".into(), json!(call.timestamp));
        let lot = lot_of(&record);

        save(state, test_id, &record)?;
        state.put(composite_key(TEST_BY_LOT, &[lot.as_str(), test_id]), vec![INDEX_MARKER]);
        Ok(())
    }

    fn update_test(state: &mut WorldState, call: Invocation<'_>, test_id: &str, json: &str) -> Result<(), String> {
        let existing = load_object(state, test_id)?.ok_or_else(|| format!("test {test_id} not found"))?;
        let mut updated = match serde_json::from_str::<Value>(json) {
            Ok(Value::Object(fields)) => fields,
            Ok(_) => return Err("test record must be a JSON object".into()),
            Err(e) => return Err(format!("invalid test JSON: {e}")),
        };

        updated.insert("test_id".into(), json!(test_id));
        updated.insert("version".into(), json!(version_of(&existing) + 1));
        updated.insert(
            "created_at".into(),
            existing.get("created_at").cloned().unwrap_or(Value::Null),
        );
        updated.insert("last_updated_at".into(), json!(call.timestamp));

        let (old_lot, new_lot) = (lot_of(&existing), lot_of(&updated));
        if old_lot != new_lot {
            state.delete(&composite_key(TEST_BY_LOT, &[old_lot.as_str(), test_id]));
            state.put(composite_key(TEST_BY_LOT, &[new_lot.as_str(), test_id]), vec![INDEX_MARKER]);
        }
        save(state, test_id, &updated)
    }

    fn test_by_id(state: &WorldState, test_id: &str) -> Result<Map<String, Value>, String> {
        required(test_id, "testID")?;
        load_object(state, test_id)?.ok_or_else(|| format!("test {test_id} not found"))
    }

    fn tests_by_lot(state: &WorldState, lot: &str) -> Result<Vec<u8>, String> {
        required(lot, "cassetteLot")?;
        let records = indexed_keys(state, TEST_BY_LOT, lot)
            .iter()
            .map(|test_id| Self::test_by_id(state, test_id))
            .collect::<Result<Vec<_>, _>>()?;
        list(records)
    }

    fn store_model(state: &mut WorldState, call: Invocation<'_>, key: &str, payload: &str) -> Result<(), String> {
        if key.is_empty() || payload.is_empty() {
            return Err("modelKey and modelData must not be empty".into());
        }
        if !KNOWN_MODEL_KEYS.contains(&key) {
            return Err(format!("invalid modelKey {key}"));
        }
        let version = load_object(state, key)?.map_or(1, |existing| version_of(&existing) + 1);

        let mut model = Map::new();
        model.insert("updated_at".into(), json!(call.timestamp));
        model.insert("version".into(), json!(version));
        model.insert("modelKey".into(), json!(key));
        model.insert("modelData".into(), json!(payload));
        save(state, key, &model)
    }

    fn store_planilha(state: &mut WorldState, call: Invocation<'_>, lot: &str, hash: &str) -> Result<(), String> {
        if lot.is_empty() || hash.is_empty() {
            return Err("casseteLot and hashPlanilha are required".into());
        }
        let record = match load_object(state, hash)? {
            Some(mut existing) => {
                existing.insert("version".into(), json!(version_of(&existing) + 1));
                existing.insert("last_updated_at".into(), json!(call.timestamp));
                existing
            }
            None => {
                state.put(composite_key(PLANILHA_BY_LOT, &[lot, hash]), vec![INDEX_MARKER]);
                let mut fresh = Map::new();
                fresh.insert("version".into(), json!(0));
                fresh.insert("last_updated_at".into(), json!(call.timestamp));
                fresh.insert("timestamp".into(), json!(call.timestamp));
                fresh.insert("cassete_lot".into(), json!(lot));
                fresh.insert("hash_planilha".into(), json!(hash));
                fresh
            }
        };
        save(state, hash, &record)
    }

    fn planilha_by_hash(state: &WorldState, hash: &str) -> Result<Map<String, Value>, String> {
        required(hash, "hashPlanilha")?;
        load_object(state, hash)?.ok_or_else(|| format!("planilha {hash} not found"))
    }

    fn planilhas_by_lot(state: &WorldState, lot: &str) -> Result<Vec<u8>, String> {
        required(lot, "casseteLot")?;
        let records = indexed_keys(state, PLANILHA_BY_LOT, lot)
            .iter()
            .map(|hash| Self::planilha_by_hash(state, hash))
            .collect::<Result<Vec<_>, _>>()?;
        list(records)
    }
}

fn lot_of(record: &Map<String, Value>) -> String {
    record
        .get("cassette_lot")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

impl ChaincodeLogic for SollytchChainContract {
    fn invoke(&self, state: &mut WorldState, call: Invocation<'_>) -> Result<Vec<u8>, String> {
        match (call.function, call.args) {
            ("StoreTest", [test_id, json, features]) => {
                Self::store_test(state, call, test_id, json, features).map(|()| Vec::new())
            }
            ("UpdateTest", [test_id, json]) => Self::update_test(state, call, test_id, json).map(|()| Vec::new()),
            ("GetTestByID", [test_id]) => object(&Self::test_by_id(state, test_id)?),
            ("GetTestsByLote", [lot]) => Self::tests_by_lot(state, lot),
            ("StoreModel", [key, payload]) => Self::store_model(state, call, key, payload).map(|()| Vec::new()),
            ("StorePlanilha", [lot, hash]) => Self::store_planilha(state, call, lot, hash).map(|()| Vec::new()),
            ("GetPlanilhaByHash", [hash]) => object(&Self::planilha_by_hash(state, hash)?),
            ("GetPlanilhasByLote", [lot]) => Self::planilhas_by_lot(state, lot),
            (function, args) => Err(format!(
                "function {function} with {} arguments is not defined",
                args.len()
            )),
        }
    }
}

/// Image digests indexed by kit.
#[derive(Debug, Default, Clone, Copy)]
pub struct SollytchImageContract;

impl SollytchImageContract {
    fn store_image(state: &mut WorldState, call: Invocation<'_>, kit: &str, hash: &str) -> Result<(), String> {
        if kit.is_empty() || hash.is_empty() {
            return Err("hashData and idKit are required".into());
        }
        let asset = match load_object(state, hash)? {
            Some(mut existing) => {
                existing.insert("version".into(), json!(version_of(&existing) + 1));
                existing.insert("lastUpdatedAt".into(), json!(call.timestamp));
                existing
            }
            None => {
                state.put(composite_key(IMAGE_BY_KIT, &[kit, hash]), vec![INDEX_MARKER]);
                let mut fresh = Map::new();
                fresh.insert("version".into(), json!(0));
                fresh.insert("lastUpdatedAt".into(), json!(call.timestamp));
                fresh.insert("timestamp".into(), json!(call.timestamp));
                fresh.insert("idKit".into(), json!(kit));
                fresh.insert("hashData".into(), json!(hash));
                fresh
            }
        };
        save(state, hash, &asset)
    }

    fn image_by_hash(state: &WorldState, hash: &str) -> Result<Map<String, Value>, String> {
        required(hash, "hashImagem")?;
        load_object(state, hash)?.ok_or_else(|| format!("image {hash} not found"))
    }

    fn images_by_kit(state: &WorldState, kit: &str) -> Result<Vec<u8>, String> {
        required(kit, "idKit")?;
        let assets = indexed_keys(state, IMAGE_BY_KIT, kit)
            .iter()
            .map(|hash| Self::image_by_hash(state, hash))
            .collect::<Result<Vec<_>, _>>()?;
        list(assets)
    }
}

impl ChaincodeLogic for SollytchImageContract {
    fn invoke(&self, state: &mut WorldState, call: Invocation<'_>) -> Result<Vec<u8>, String> {
        match (call.function, call.args) {
            ("StoreImage", [kit, hash]) => Self::store_image(state, call, kit, hash).map(|()| Vec::new()),
            ("GetImageByID", [hash]) => object(&Self::image_by_hash(state, hash)?),
            ("GetImagesByKit", [kit]) => Self::images_by_kit(state, kit),
            (function, args) => Err(format!(
                "function {function} with {} arguments is not defined",
                args.len()
            )),
        }
    }
}

/// In-process network hosting both contracts under the profile's names.
pub fn simulated_network(profile: &LedgerProfile) -> InMemoryLedger {
    InMemoryLedger::new()
        .with_contract(profile.chain_contract.clone(), SollytchChainContract)
        .with_contract(profile.image_contract.clone(), SollytchImageContract)
}
