//! RPC Error Types
//!
//! Maps application errors to JSON-RPC error codes.

use jsonrpsee::types::ErrorObjectOwned;
use workq_core::domain::DomainError;
use workq_core::error::AppError;

/// RPC Error Codes
pub mod code {
    pub const VALIDATION_ERROR: i32 = 4000;
    pub const NOT_FOUND: i32 = 4001;
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const EXECUTION_ERROR: i32 = 5002;
}

/// Convert AppError to JSON-RPC ErrorObject
pub fn to_rpc_error(err: AppError) -> ErrorObjectOwned {
    match err {
        AppError::Domain(DomainError::JobNotFound(id)) => ErrorObjectOwned::owned(
            code::NOT_FOUND,
            format!("Job {} not found", id),
            Some(id),
        ),
        AppError::Domain(DomainError::Validation(msg)) => {
            ErrorObjectOwned::owned(code::VALIDATION_ERROR, msg, None::<()>)
        }
        AppError::Serialization(e) => {
            ErrorObjectOwned::owned(code::VALIDATION_ERROR, e.to_string(), None::<()>)
        }
        AppError::Execution(e) => {
            ErrorObjectOwned::owned(code::EXECUTION_ERROR, e.to_string(), None::<()>)
        }
        AppError::Config(msg) | AppError::Internal(msg) => {
            ErrorObjectOwned::owned(code::INTERNAL_ERROR, msg, None::<()>)
        }
    }
}
