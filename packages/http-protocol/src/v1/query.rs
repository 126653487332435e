//! The query string of a tracker GET request as a flat key/value map.
//!
//! Clients are sloppy about separators, so `&`, `;` and a stray leading `?`
//! are all accepted. The same key may appear more than once (`info_hash` in
//! scrape requests); values accumulate in order of appearance.
//!
//! Values are kept in their raw, still percent-encoded form: `info_hash` and
//! `peer_id` decode to arbitrary bytes that are not valid UTF-8, so each
//! typed request decodes its fields with the right target type (see
//! [`crate::v1::percent_encoding`]).
use std::str::FromStr;

use multimap::MultiMap;
use percent_encoding::percent_decode_str;

/// A parsed query string.
#[derive(Debug, Clone, Default)]
pub struct Query {
    params: MultiMap<String, String>,
}

impl Query {
    /// The first raw (still percent-encoded) value for a key.
    #[must_use]
    pub fn get_raw_param(&self, name: &str) -> Option<&str> {
        self.params.get(name).map(String::as_str)
    }

    /// All raw values for a key, in order of appearance.
    #[must_use]
    pub fn get_raw_param_vec(&self, name: &str) -> Vec<&str> {
        self.params.get_vec(name).map_or_else(Vec::new, |values| {
            values.iter().map(String::as_str).collect()
        })
    }

    /// The first value for a key, percent-decoded as UTF-8 text.
    #[must_use]
    pub fn get_param(&self, name: &str) -> Option<String> {
        self.get_raw_param(name)
            .map(|raw| percent_decode_str(raw).decode_utf8_lossy().into_owned())
    }
}

impl FromStr for Query {
    type Err = std::convert::Infallible;

    fn from_str(raw_query: &str) -> Result<Self, Self::Err> {
        let mut params = MultiMap::new();

        for pair in raw_query.split(['&', ';', '?']).filter(|pair| !pair.is_empty()) {
            let (raw_name, raw_value) = match pair.split_once('=') {
                Some((name, value)) => (name, value),
                None => (pair, ""),
            };

            let name = percent_decode_str(raw_name).decode_utf8_lossy().into_owned();

            params.insert(name, raw_value.to_string());
        }

        Ok(Query { params })
    }
}

#[cfg(test)]
mod tests {

    mod the_query {
        use crate::v1::query::Query;

        #[test]
        fn it_should_parse_ampersand_separated_pairs() {
            let query: Query = "port=6881&uploaded=0".parse().unwrap();

            assert_eq!(query.get_param("port"), Some("6881".to_string()));
            assert_eq!(query.get_param("uploaded"), Some("0".to_string()));
        }

        #[test]
        fn it_should_accept_semicolon_separators_and_a_leading_question_mark() {
            let query: Query = "?port=6881;compact=1".parse().unwrap();

            assert_eq!(query.get_param("port"), Some("6881".to_string()));
            assert_eq!(query.get_param("compact"), Some("1".to_string()));
        }

        #[test]
        fn it_should_accumulate_repeated_keys_in_order() {
            let query: Query = "info_hash=aa&info_hash=bb".parse().unwrap();

            assert_eq!(query.get_raw_param_vec("info_hash"), vec!["aa", "bb"]);
        }

        #[test]
        fn it_should_keep_values_in_their_raw_percent_encoded_form() {
            let query: Query = "info_hash=%AA%BB".parse().unwrap();

            assert_eq!(query.get_raw_param("info_hash"), Some("%AA%BB"));
        }

        #[test]
        fn it_should_percent_decode_text_params() {
            let query: Query = "key=a%20b".parse().unwrap();

            assert_eq!(query.get_param("key"), Some("a b".to_string()));
        }

        #[test]
        fn it_should_treat_a_key_without_a_value_as_an_empty_value() {
            let query: Query = "compact".parse().unwrap();

            assert_eq!(query.get_param("compact"), Some(String::new()));
        }

        #[test]
        fn it_should_return_none_for_a_missing_key() {
            let query: Query = "port=6881".parse().unwrap();

            assert_eq!(query.get_param("peer_id"), None);
            assert!(query.get_raw_param_vec("info_hash").is_empty());
        }
    }
}
