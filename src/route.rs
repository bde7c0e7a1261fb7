//! Route parsing and operation classification.
//!
//! A route is the request target without its leading slash, e.g.
//! `getAllDataFromTheTable?tableName=users`. It is matched by prefix against
//! the operation names in a fixed priority order, first match wins; anything
//! else names a static asset.

use tracing::warn;

use crate::assets::INDEX;
use crate::error::{DebugError, Result};
use crate::types::RowUpdateRequest;

/// Path plus undecoded query pairs of one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Route {
    raw: String,
    path: String,
    query: Vec<(String, String)>,
}

impl Route {
    /// Build a route from the request target. Absent or empty targets fall
    /// back to the landing page.
    pub fn parse(target: Option<&str>) -> Self {
        let raw = match target {
            Some(t) if !t.is_empty() => t.to_string(),
            _ => INDEX.to_string(),
        };
        let (path, query) = match raw.split_once('?') {
            Some((path, query)) => (path.to_string(), query),
            None => (raw.clone(), ""),
        };
        // Split by hand rather than with `url::form_urlencoded`, which decodes
        // lossily; values must fail on invalid UTF-8 (see `decode`).
        let query = query
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| match pair.split_once('=') {
                Some((k, v)) => (k.to_string(), v.to_string()),
                None => (pair.to_string(), String::new()),
            })
            .collect();
        Self { raw, path, query }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Decoded value of the first parameter called `name`.
    pub fn param(&self, name: &str) -> Result<Option<String>> {
        for (key, value) in &self.query {
            if decode(name, key).ok().as_deref() == Some(name) {
                return decode(name, value).map(Some);
            }
        }
        Ok(None)
    }

    /// Like [`Route::param`] but absent or blank values are an error.
    pub fn required(&self, name: &'static str) -> Result<String> {
        match self.param(name)? {
            Some(value) if !value.trim().is_empty() => Ok(value),
            _ => Err(DebugError::MissingParameter(name)),
        }
    }
}

fn decode(name: &str, raw: &str) -> Result<String> {
    let spaced = raw.replace('+', " ");
    urlencoding::decode(&spaced)
        .map(|s| s.into_owned())
        .map_err(|e| DebugError::Decode {
            name: name.to_string(),
            reason: e.to_string(),
        })
}

/// One debug action with its typed parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    GetAllDataFromTheTable { table_name: String },
    Query { sql: String },
    GetDbList,
    GetTableList { database: String },
    DownloadDb,
    UpdateTableData {
        table_name: String,
        updates: Vec<RowUpdateRequest>,
    },
    Asset { name: String },
}

type Build = fn(&Route) -> Result<Operation>;

/// Route prefixes in match order, each with the builder for its operation.
const ROUTES: &[(&str, Build)] = &[
    ("getAllDataFromTheTable", get_all_data_from_the_table),
    ("query", query),
    ("getDbList", get_db_list),
    ("getTableList", get_table_list),
    ("downloadDb", download_db),
    ("updateTableData", update_table_data),
];

fn get_all_data_from_the_table(route: &Route) -> Result<Operation> {
    Ok(Operation::GetAllDataFromTheTable {
        table_name: route.required("tableName")?,
    })
}

fn query(route: &Route) -> Result<Operation> {
    Ok(Operation::Query {
        sql: route.required("query")?,
    })
}

fn get_db_list(_: &Route) -> Result<Operation> {
    Ok(Operation::GetDbList)
}

fn download_db(_: &Route) -> Result<Operation> {
    Ok(Operation::DownloadDb)
}

fn get_table_list(route: &Route) -> Result<Operation> {
    Ok(Operation::GetTableList {
        database: route.required("database")?,
    })
}

fn update_table_data(route: &Route) -> Result<Operation> {
    let table_name = route.required("tableName")?;
    let payload = route.required("updatedData")?;
    let updates: Vec<RowUpdateRequest> = serde_json::from_str(&payload).inspect_err(|e| {
        warn!(error = %e, "updatedData is not a list of row updates");
    })?;
    Ok(Operation::UpdateTableData {
        table_name,
        updates,
    })
}

fn lookup(route: &Route) -> Option<&'static (&'static str, Build)> {
    ROUTES.iter().find(|(prefix, _)| route.as_str().starts_with(prefix))
}

impl Operation {
    pub fn from_route(route: &Route) -> Result<Self> {
        match lookup(route) {
            Some((_, build)) => build(route),
            None => Ok(Operation::Asset {
                name: route.path().to_string(),
            }),
        }
    }
}

/// Name of the operation a route selects, for logs.
pub fn operation_name(route: &Route) -> &'static str {
    lookup(route).map_or("asset", |(prefix, _)| *prefix)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(target: &str) -> Result<Operation> {
        Operation::from_route(&Route::parse(Some(target)))
    }

    #[test]
    fn empty_route_is_the_landing_page() {
        assert_eq!(Route::parse(None).as_str(), "index.html");
        assert_eq!(Route::parse(Some("")).as_str(), "index.html");
        assert_eq!(
            Operation::from_route(&Route::parse(None)).unwrap(),
            Operation::Asset {
                name: "index.html".into()
            }
        );
    }

    #[test]
    fn first_occurrence_of_a_parameter_wins() {
        let route = Route::parse(Some("getTableList?database=a.db&database=b.db"));
        assert_eq!(route.param("database").unwrap().as_deref(), Some("a.db"));
        assert_eq!(route.param("missing").unwrap(), None);
    }

    #[test]
    fn values_are_percent_decoded() {
        let route = Route::parse(Some("query?query=SELECT%20*%20FROM%20t%20WHERE%20a%3D1%26b%2Fc"));
        assert_eq!(
            route.param("query").unwrap().as_deref(),
            Some("SELECT * FROM t WHERE a=1&b/c")
        );
        let route = Route::parse(Some("query?query=SELECT+1"));
        assert_eq!(route.param("query").unwrap().as_deref(), Some("SELECT 1"));
    }

    #[test]
    fn invalid_utf8_is_a_decode_error() {
        let route = Route::parse(Some("query?query=%FF%FE"));
        assert!(matches!(route.param("query"), Err(DebugError::Decode { .. })));
    }

    #[test]
    fn prefixes_match_regardless_of_trailing_text() {
        assert!(matches!(op("queryX?query=select%201").unwrap(), Operation::Query { .. }));
        assert_eq!(op("getDbListing").unwrap(), Operation::GetDbList);
        assert_eq!(op("downloadDb?x=1").unwrap(), Operation::DownloadDb);
        assert_eq!(
            op("getTableList?database=app.db").unwrap(),
            Operation::GetTableList {
                database: "app.db".into()
            }
        );
        assert_eq!(
            op("getAllDataFromTheTable?tableName=users").unwrap(),
            Operation::GetAllDataFromTheTable {
                table_name: "users".into()
            }
        );
    }

    #[test]
    fn every_prefix_builds_its_own_operation() {
        let cases = [
            ("getAllDataFromTheTable?tableName=t", "getAllDataFromTheTable"),
            ("query?query=select%201", "query"),
            ("getDbList", "getDbList"),
            ("getTableList?database=a.db", "getTableList"),
            ("downloadDb", "downloadDb"),
            ("updateTableData?tableName=t&updatedData=%5B%5D", "updateTableData"),
        ];
        assert_eq!(cases.len(), ROUTES.len());
        for (target, name) in cases {
            let route = Route::parse(Some(target));
            assert_eq!(operation_name(&route), name);
            let op = Operation::from_route(&route).unwrap();
            assert!(!matches!(op, Operation::Asset { .. }), "{target} became {op:?}");
        }
        assert_eq!(operation_name(&Route::parse(Some("app.js"))), "asset");
    }

    #[test]
    fn unmatched_routes_are_assets() {
        assert_eq!(
            op("favicon.ico").unwrap(),
            Operation::Asset {
                name: "favicon.ico".into()
            }
        );
        assert_eq!(
            op("js/app.js?v=2").unwrap(),
            Operation::Asset {
                name: "js/app.js".into()
            }
        );
        // case-sensitive prefixes
        assert!(matches!(op("GETDBLIST").unwrap(), Operation::Asset { .. }));
    }

    #[test]
    fn missing_parameters_are_errors() {
        assert!(matches!(
            op("getAllDataFromTheTable"),
            Err(DebugError::MissingParameter("tableName"))
        ));
        assert!(matches!(op("query?query=%20"), Err(DebugError::MissingParameter("query"))));
        assert!(matches!(
            op("getTableList?db=x"),
            Err(DebugError::MissingParameter("database"))
        ));
        assert!(matches!(
            op("updateTableData?tableName=users"),
            Err(DebugError::MissingParameter("updatedData"))
        ));
    }

    #[test]
    fn update_payload_is_parsed() {
        let payload = urlencoding::encode(
            r#"[{"columnName":"name","columnValue":"a&b=c","primaryKeyColumnName":"id","primaryKeyColumnValue":"1","columnType":"text"}]"#,
        );
        let parsed = op(&format!("updateTableData?tableName=users&updatedData={payload}")).unwrap();
        let Operation::UpdateTableData {
            table_name,
            updates,
        } = parsed
        else {
            panic!("expected updateTableData, got {parsed:?}");
        };
        assert_eq!(table_name, "users");
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].column_value, "a&b=c");
    }

    #[test]
    fn malformed_update_payload_is_an_error() {
        assert!(matches!(
            op("updateTableData?tableName=users&updatedData=%5Bnot%20json"),
            Err(DebugError::Payload(_))
        ));
    }
}
