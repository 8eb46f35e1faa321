#[cfg(test)]
mod common;


#[cfg(test)]
mod profile_http_tests;
