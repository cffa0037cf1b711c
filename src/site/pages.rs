//! The pages of the web client and the paths they live at.

/// Who may see a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Anyone.
    Public,
    /// Only logged-in users; others are sent to log in.
    LoggedIn,
    /// Only visitors who are not logged in; users are sent home.
    LoggedOut,
}

impl Access {
    /// The login state the gate requires, or `None` if the page is ungated.
    pub fn required_login(self) -> Option<bool> {
        match self {
            Self::Public => None,
            Self::LoggedIn => Some(true),
            Self::LoggedOut => Some(false),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Home,
    Privacy,
    Faq,
    Groups,
    GroupPolls,
    GroupCreation,
    PollViewer,
    PollEditor,
    PollResults,
    Login,
    ForgotPassword,
    ResetPassword,
    Register,
    RegisterWithSchool,
    RegisterWithPollBuddy,
    AccountInfo,
    Template,
    NotFound,
}

/// Path patterns in match order. `:name` segments capture a parameter.
const ROUTES: &[(&str, Page)] = &[
    ("/", Page::Home),
    ("/privacy", Page::Privacy),
    ("/faq", Page::Faq),
    ("/groups", Page::Groups),
    ("/groups/polls", Page::GroupPolls),
    ("/groups/new", Page::GroupCreation),
    ("/poll/:pollID/view", Page::PollViewer),
    ("/pollEditor/:pollID/edit", Page::PollEditor),
    ("/polls/:pollID/results", Page::PollResults),
    ("/login", Page::Login),
    ("/login/forgot", Page::ForgotPassword),
    ("/login/reset", Page::ResetPassword),
    ("/register", Page::Register),
    ("/register/school", Page::RegisterWithSchool),
    ("/register/pollbuddy", Page::RegisterWithPollBuddy),
    ("/account", Page::AccountInfo),
    ("/template", Page::Template),
];

impl Page {
    /// The title shown in the header and, suffixed, in the browser tab.
    pub fn title(self) -> &'static str {
        match self {
            Self::Home => "Home",
            Self::Privacy => "Privacy Policy",
            Self::Faq => "FAQ",
            Self::Groups => "Groups",
            Self::GroupPolls => "Polls",
            Self::GroupCreation => "Create Group",
            Self::PollViewer => "Poll Viewer",
            Self::PollEditor => "Poll Editor",
            Self::PollResults => "Poll Results",
            Self::Login => "Login",
            Self::ForgotPassword => "Forgot Password",
            Self::ResetPassword => "Reset Password",
            Self::Register => "Register",
            Self::RegisterWithSchool => "Register with School",
            Self::RegisterWithPollBuddy => "Register with Poll Buddy",
            Self::AccountInfo => "Account Info",
            Self::Template => "Template",
            Self::NotFound => "404",
        }
    }

    pub fn access(self) -> Access {
        match self {
            Self::Groups
            | Self::GroupPolls
            | Self::GroupCreation
            | Self::PollViewer
            | Self::PollEditor
            | Self::PollResults
            | Self::AccountInfo => Access::LoggedIn,
            Self::Login
            | Self::ForgotPassword
            | Self::ResetPassword
            | Self::Register
            | Self::RegisterWithSchool
            | Self::RegisterWithPollBuddy => Access::LoggedOut,
            Self::Home | Self::Privacy | Self::Faq | Self::Template | Self::NotFound => {
                Access::Public
            }
        }
    }
}

/// A path matched to its page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved<'a> {
    pub page: Page,
    /// Captured `:name` segments, in pattern order.
    pub params: Vec<(&'static str, &'a str)>,
}

impl<'a> Resolved<'a> {
    pub fn param(&self, name: &str) -> Option<&'a str> {
        self.params
            .iter()
            .find(|(param, _)| *param == name)
            .map(|(_, value)| *value)
    }
}

/// Find the page for `path`.
///
/// Static segments match case-insensitively and a single trailing slash is
/// ignored. Paths matching no pattern resolve to [`Page::NotFound`].
pub fn resolve(path: &str) -> Resolved<'_> {
    ROUTES
        .iter()
        .find_map(|(pattern, page)| {
            match_pattern(*pattern, path).map(|params| Resolved { page: *page, params })
        })
        .unwrap_or(Resolved {
            page: Page::NotFound,
            params: Vec::new(),
        })
}

fn segments(path: &str) -> Vec<&str> {
    let path = path.strip_prefix('/').unwrap_or(path);
    let path = path.strip_suffix('/').unwrap_or(path);
    if path.is_empty() {
        Vec::new()
    } else {
        path.split('/').collect()
    }
}

fn match_pattern<'a>(pattern: &'static str, path: &'a str) -> Option<Vec<(&'static str, &'a str)>> {
    let expected = segments(pattern);
    let actual = segments(path);
    if expected.len() != actual.len() {
        return None;
    }

    let mut params = Vec::new();
    for (expected, actual) in expected.into_iter().zip(actual) {
        match expected.strip_prefix(':') {
            Some(name) if !actual.is_empty() => params.push((name, actual)),
            Some(_) => return None,
            None if expected.eq_ignore_ascii_case(actual) => {}
            None => return None,
        }
    }
    Some(params)
}
