use std::fs;

use globset::GlobBuilder;
use graphmock_core::{default_scalars, mock_list_with, BaseMocks, MockServer, MockValue, Request};

fn base_mocks() -> BaseMocks {
    BaseMocks::new()
        .constant("Object", "property", "base property")
        .constant("Node", "id", "node")
        .constant(
            "Query",
            "listOfObjects",
            mock_list_with(2, |args, index| {
                MockValue::object([(
                    "property",
                    format!("{}:{}", args.get_str("argument").unwrap_or("none"), index),
                )])
            }),
        )
        .constant(
            "Query",
            "search",
            mock_list_with(2, |_, index| match index {
                0 => MockValue::object([("__typename", MockValue::from("Object"))]),
                _ => MockValue::object([
                    ("__typename", MockValue::from("Other")),
                    ("value", MockValue::from(7)),
                ]),
            }),
        )
}

#[test]
fn test() {
    let server = MockServer::new(include_str!("test.graphql"), base_mocks())
        .unwrap()
        .with_default_mocks([default_scalars()]);
    let glob = GlobBuilder::new("./tests/scenarios/*.txt")
        .literal_separator(true)
        .build()
        .unwrap()
        .compile_matcher();

    for entry in fs::read_dir("./tests/scenarios").unwrap() {
        let entry = entry.unwrap();
        if !glob.is_match(entry.path()) {
            continue;
        }

        println!("{}", entry.path().display());

        let data = fs::read_to_string(&entry.path()).unwrap();
        let mut s = data.split("---");
        let mut n = 1;

        loop {
            println!("\tIndex: {}", n);
            let graphql = match s.next() {
                Some(graphql) => graphql,
                None => break,
            };
            let mock_override: serde_json::Value = serde_json::from_str(s.next().unwrap()).unwrap();
            let expect_response: serde_json::Value =
                serde_json::from_str(s.next().unwrap()).unwrap();

            let request = Request::new(graphql.trim())
                .mock_override(MockValue::from_template(mock_override).unwrap());
            let actual_response = serde_json::to_value(&server.execute(request).unwrap()).unwrap();
            assert_eq!(actual_response, expect_response);

            n += 1;
        }
    }
}
