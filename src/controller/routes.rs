use http::Method;

pub const BASE_PATH: &str = "/api/tasks";

/// Static method + path table of the HTTP surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Banner,
    ListAll,
    Add,
    ListPending,
    ListCompleted,
    Complete(String),
    Delete(String),
}

impl Route {
    pub fn resolve(method: &Method, path: &str) -> Option<Route> {
        if path == "/" {
            return match *method {
                Method::GET => Some(Route::Banner),
                _ => None,
            };
        }

        let rest = path.strip_prefix(BASE_PATH)?;
        let rest = rest.strip_suffix('/').unwrap_or(rest);
        let segments = match rest {
            "" => vec![],
            _ => rest.strip_prefix('/')?.split('/').collect::<Vec<&str>>(),
        };

        match (method, segments.as_slice()) {
            (&Method::GET, []) => Some(Route::ListAll),
            (&Method::POST, []) => Some(Route::Add),
            (&Method::GET, ["pending"]) => Some(Route::ListPending),
            (&Method::GET, ["completed"]) => Some(Route::ListCompleted),
            (&Method::PUT, [id, "complete"]) if !id.is_empty() => {
                Some(Route::Complete(id.to_string()))
            }
            (&Method::DELETE, [id]) if !id.is_empty() => Some(Route::Delete(id.to_string())),
            _ => None,
        }
    }
}
