pub mod fetch;
pub mod process;

pub use fetch::{AutoSource, FileSource, HttpSource, Locator, TextSource};
pub use process::{
    load_all, load_csv, parse_csv,
    record::{Dataset, Header, Record},
    utils::{clean_number, normalize_name, parse_count},
};
