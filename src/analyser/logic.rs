pub mod aggregate;
pub mod cleaning;
pub mod io;
pub mod join;
pub mod nested;
pub mod projection;
pub mod ranking;
pub mod temporal;
pub mod types;

pub use aggregate::{
    AggregateOptions, Aggregation, BucketOrder, CategorySource, NoDataWarning, aggregate_field,
    aggregate_rows, bucket_top_n, count_categories,
};
pub use cleaning::{Derivation, IntWidth, derive, filter_greater_than, narrow, rescale};
pub use io::{load_df, save_df, shape};
pub use join::inner_join;
pub use nested::{format_cast_field, parse_entities, parse_field, parse_list_field};
pub use projection::{key_by, project};
pub use ranking::{add_segment_count, top_k_titles};
pub use temporal::{parse_date_field, sort_by_date_desc, year_values};
pub use types::{CategoryBucket, CategoryCount};

#[cfg(test)]
mod tests;
