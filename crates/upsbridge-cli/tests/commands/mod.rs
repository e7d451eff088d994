mod catalog_test;
mod fetch_test;
mod parse_test;
mod serve_test;
