//! Query normalization.
//!
//! A read/mutation query is a tree of property keys, joins onto subqueries,
//! and mutation calls, any of which may carry an invocation parameter map.
//! [`strip_parameters`] removes every parameter map while preserving the
//! tree's shape and order, which is what caches and query planners key on.
//! Independent of the resolution pipeline; stateless.

use std::collections::BTreeMap;

use crate::document::Value;

/// Parameters attached to a query node.
pub type Params = BTreeMap<String, Value>;

/// One node of a read/mutation query tree.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryNode {
    /// Bare property key.
    Prop(String),
    /// Property key with invocation parameters.
    ParamProp { key: String, params: Params },
    /// Key mapped to a subquery, with parameters possibly attached.
    Join {
        key: String,
        query: Vec<QueryNode>,
        params: Option<Params>,
    },
    /// Mutation call by name.
    Call { name: String, params: Params },
}

/// Removes every parameter map from `query`, preserving shape and order.
///
/// Parameterized properties collapse to bare properties; joins keep their
/// key and recursively stripped subquery; mutation calls keep their name
/// with an empty parameter map.
pub fn strip_parameters(query: &[QueryNode]) -> Vec<QueryNode> {
    query.iter().map(strip_node).collect()
}

fn strip_node(node: &QueryNode) -> QueryNode {
    match node {
        QueryNode::Prop(key) => QueryNode::Prop(key.clone()),
        QueryNode::ParamProp { key, .. } => QueryNode::Prop(key.clone()),
        QueryNode::Join { key, query, .. } => QueryNode::Join {
            key: key.clone(),
            query: strip_parameters(query),
            params: None,
        },
        QueryNode::Call { name, .. } => QueryNode::Call {
            name: name.clone(),
            params: Params::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(entries: &[(&str, Value)]) -> Params {
        entries
            .iter()
            .map(|(key, value)| (key.to_string(), value.clone()))
            .collect()
    }

    #[test]
    fn test_bare_props_unchanged() {
        let query = vec![
            QueryNode::Prop("name".into()),
            QueryNode::Prop("email".into()),
        ];

        assert_eq!(strip_parameters(&query), query);
    }

    #[test]
    fn test_parameterized_prop_collapses_to_bare_prop() {
        let query = vec![QueryNode::ParamProp {
            key: "prop".into(),
            params: params(&[("arg", Value::String("foo".into()))]),
        }];

        assert_eq!(strip_parameters(&query), vec![QueryNode::Prop("prop".into())]);
    }

    #[test]
    fn test_join_strips_parameters_at_every_level() {
        let query = vec![QueryNode::Join {
            key: "friends".into(),
            params: Some(params(&[("limit", Value::Integer(10))])),
            query: vec![
                QueryNode::Prop("name".into()),
                QueryNode::ParamProp {
                    key: "avatar".into(),
                    params: params(&[("size", Value::String("small".into()))]),
                },
                QueryNode::Join {
                    key: "posts".into(),
                    params: None,
                    query: vec![QueryNode::ParamProp {
                        key: "title".into(),
                        params: params(&[("lang", Value::String("en".into()))]),
                    }],
                },
            ],
        }];

        assert_eq!(
            strip_parameters(&query),
            vec![QueryNode::Join {
                key: "friends".into(),
                params: None,
                query: vec![
                    QueryNode::Prop("name".into()),
                    QueryNode::Prop("avatar".into()),
                    QueryNode::Join {
                        key: "posts".into(),
                        params: None,
                        query: vec![QueryNode::Prop("title".into())],
                    },
                ],
            }]
        );
    }

    #[test]
    fn test_call_keeps_name_and_drops_parameters() {
        let query = vec![QueryNode::Call {
            name: "user/create".into(),
            params: params(&[("name", Value::String("ada".into()))]),
        }];

        assert_eq!(
            strip_parameters(&query),
            vec![QueryNode::Call {
                name: "user/create".into(),
                params: Params::new(),
            }]
        );
    }

    #[test]
    fn test_order_preserved_across_mixed_nodes() {
        let query = vec![
            QueryNode::ParamProp {
                key: "b".into(),
                params: params(&[("x", Value::Integer(1))]),
            },
            QueryNode::Prop("a".into()),
            QueryNode::Call {
                name: "sync".into(),
                params: params(&[("force", Value::Bool(true))]),
            },
        ];

        assert_eq!(
            strip_parameters(&query),
            vec![
                QueryNode::Prop("b".into()),
                QueryNode::Prop("a".into()),
                QueryNode::Call {
                    name: "sync".into(),
                    params: Params::new(),
                },
            ]
        );
    }
}
