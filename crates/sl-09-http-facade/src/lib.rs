//! # SL-09: HTTP Facade
//!
//! REST surface over [`sl_08_lab_ledger`]. Every request opens its own
//! ledger scope; nothing is shared between requests except the connector.
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | POST | `/store/test` | store one or many test records |
//! | POST | `/store/image` | digest an image and record it under a kit |
//! | POST | `/store/model` | store a model artifact |
//! | POST | `/store/planilha` | record a spreadsheet digest under a lot |
//! | GET | `/query/test/id/:testID`, `/query/test/lote/:lote` | test lookups |
//! | GET | `/query/image/hash/:imageHash`, `/query/image/kit/:kitID` | image lookups |
//! | GET | `/query/planilha/hash/:planilhaHash`, `/query/planilha/lote/:lote` | spreadsheet lookups |
//! | PUT | `/update/test` | replace a test record |
//! | PATCH | `/update/test/field` | edit one field of a test record |
//! | POST | `/query/test`, `/query/image` | legacy body-based lookups |
//! | GET | `/health` | open and close one ledger connection |
//!
//! Status codes: 400 for missing or malformed input, 404 for empty lookups,
//! 500 for ledger and transport failures. Error bodies are `{"error": "..."}`.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod errors;
pub mod handlers;
pub mod requests;
pub mod router;

pub use config::FacadeConfig;
pub use errors::{ApiError, FacadeError};
pub use router::{build_router, serve, AppState};
