use tonic::Code;

/// Maps an HTTP status code onto the gRPC status taxonomy.
///
/// Follows the gRPC HTTP mapping table; codes it does not list map to
/// [`Code::Unknown`].
pub fn rpc_code_from_http(status: u16) -> Code {
    match status {
        // OK, Created, Accepted
        200..=202 => Code::Ok,
        400 => Code::InvalidArgument,
        401 => Code::Unauthenticated,
        403 => Code::PermissionDenied,
        404 => Code::NotFound,
        409 => Code::Aborted,
        429 => Code::ResourceExhausted,
        500 => Code::Internal,
        501 => Code::Unimplemented,
        503 => Code::Unavailable,
        504 => Code::DeadlineExceeded,
        _ => Code::Unknown,
    }
}
