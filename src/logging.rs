use rocket::{
    fairing::{Fairing, Info, Kind},
    http::StatusClass,
    Data, Orbit, Request, Response, Rocket,
};
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicUsize, Ordering};

/// A unique identifier for a particular request.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Ord, PartialOrd)]
pub struct RequestId(pub usize);

impl Display for RequestId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl RequestId {
    /// Atomically get the next ID, wrapping around at `usize::MAX`.
    pub fn next() -> RequestId {
        static REQUEST_ID_COUNTER: AtomicUsize = AtomicUsize::new(0);
        RequestId(REQUEST_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

/// Which half of the server a request is for.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Surface {
    Api,
    Page,
}

impl Surface {
    pub fn of(path: &str) -> Self {
        let first = path.trim_start_matches('/').split('/').next();
        if first == Some("api") {
            Self::Api
        } else {
            Self::Page
        }
    }
}

impl Display for Surface {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Api => "api",
            Self::Page => "page",
        })
    }
}

/// A rocket fairing that logs every request and response, tagged with its
/// [`RequestId`] and [`Surface`].
#[derive(Debug, Copy, Clone)]
pub struct LoggerFairing;

#[rocket::async_trait]
impl Fairing for LoggerFairing {
    fn info(&self) -> Info {
        Info {
            name: "Logger",
            kind: Kind::Liftoff | Kind::Request | Kind::Response | Kind::Shutdown,
        }
    }

    async fn on_liftoff(&self, rocket: &Rocket<Orbit>) {
        let scheme = if rocket.config().tls_enabled() {
            "https"
        } else {
            "http"
        };
        let address = &rocket.config().address;
        let port = &rocket.config().port;
        info!("Poll Buddy listening on {scheme}://{address}:{port}");
    }

    async fn on_request(&self, req: &mut Request<'_>, _data: &mut Data<'_>) {
        let id = req.local_cache(RequestId::next);
        let surface = Surface::of(req.uri().path().as_str());
        info!("->req{id} [{surface}] {} {}", req.method(), req.uri());
    }

    async fn on_response<'r>(&self, req: &'r Request<'_>, res: &mut Response<'r>) {
        let id = req.local_cache(RequestId::next);
        let surface = Surface::of(req.uri().path().as_str());
        let status = res.status();
        let handler = match req.route() {
            Some(route) => match route.name {
                Some(ref name) => name.to_string(),
                None => route.uri.to_string(),
            },
            None => "catcher".to_string(),
        };

        match (status.class(), res.headers().get_one("Location")) {
            (StatusClass::Redirection, Some(to)) => {
                info!("<-rsp{id} [{surface}] {status} {handler} -> {to}")
            }
            (StatusClass::ServerError, _) => error!("<-rsp{id} [{surface}] {status} {handler}"),
            (StatusClass::ClientError, _) => warn!("<-rsp{id} [{surface}] {status} {handler}"),
            _ => info!("<-rsp{id} [{surface}] {status} {handler}"),
        }
    }

    async fn on_shutdown(&self, _rocket: &Rocket<Orbit>) {
        warn!("Shutdown requested, stopping gracefully...");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_ids_increase() {
        let first = RequestId::next();
        let second = RequestId::next();
        assert!(second > first);
        assert_eq!(format!("{}", RequestId(7)), "7");
    }

    #[test]
    fn surfaces() {
        assert_eq!(Surface::of("/api/users/me"), Surface::Api);
        assert_eq!(Surface::of("/api"), Surface::Api);
        assert_eq!(Surface::of("/"), Surface::Page);
        assert_eq!(Surface::of("/apiary"), Surface::Page);
        assert_eq!(Surface::of("/groups/api"), Surface::Page);
        assert_eq!(Surface::Api.to_string(), "api");
    }
}
