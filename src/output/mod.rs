pub mod formatter;

pub use formatter::{
    format_distance, format_driver_detail, format_lookup, format_ranked_table,
    format_recommendation, format_score, format_tsv, should_use_colors,
};
