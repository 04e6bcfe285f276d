pub const INVALID_INPUT: &str = "invalid_input";
pub const UNAVAILABLE: &str = "unavailable";
pub const NOT_FOUND: &str = "not_found";
pub const CONVERSION_FAILED: &str = "conversion_failed";
pub const NO_OUTPUT_PRODUCED: &str = "no_output_produced";
pub const MALFORMED_OUTPUT: &str = "malformed_output";
pub const INTERNAL_ERROR: &str = "internal_error";

// JSON-RPC protocol level
pub const METHOD_NOT_FOUND: i64 = -32601;
