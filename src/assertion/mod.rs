/// Response validation and field extraction
mod evaluator;
mod extractor;
mod parser;
mod types;

pub use evaluator::{
    each_item_has_fields, each_value_equals, extract, field_equals, field_not_null,
    field_string_equals, first_item_field_equals, list_at, list_len_at_least, non_empty_list,
    response_time_below, status_code_is,
};
pub use extractor::{body_json, extract_value, value_as_string, values_equal};
pub use parser::parse_field_path;
pub use types::{AssertError, FieldPath, Segment};
