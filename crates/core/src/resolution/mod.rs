//! Overload resolution: applicability and winner selection.

mod methods;
mod usage;

pub use methods::{
    assignable_matching_type_parameters, find_most_applicable, find_most_applicable_with,
    is_applicable, replace_type_param,
};
pub use usage::{find_most_applicable_usage, is_applicable_usage};
