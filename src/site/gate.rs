/// What to do with a request for a gated page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    Render,
    /// Send the visitor to `to`; `prev_route` is where they were headed, so
    /// the login page can send them back.
    Redirect {
        to: &'static str,
        prev_route: Option<String>,
    },
}

/// Gate a page that requires the visitor to be logged in (`required`) or
/// logged out (`!required`).
///
/// A visitor in the required state sees the page. Otherwise visitors who need
/// to log in go to `/login`, remembering `pathname`, and logged-in users who
/// wandered onto a logged-out page go to `/`.
pub fn gate(required: bool, logged_in: bool, pathname: &str) -> GateDecision {
    if logged_in == required {
        GateDecision::Render
    } else if required {
        GateDecision::Redirect {
            to: "/login",
            prev_route: Some(pathname.to_string()),
        }
    } else {
        GateDecision::Redirect {
            to: "/",
            prev_route: None,
        }
    }
}

/// Read the client-side login flag. Only the exact string `"true"` counts.
pub fn logged_in_flag(value: Option<&str>) -> bool {
    value == Some("true")
}
