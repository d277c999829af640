mod catalog_tests;
mod common;
mod crawl_tests;
