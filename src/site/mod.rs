//! Server side of the web client: every non-API path is answered with the
//! page shell for its page, after the login gate has had its say.

use rocket::{
    http::{
        uri::{fmt::Path, Segments},
        CookieJar, RawStr, Status,
    },
    response::{content::RawHtml, status, Redirect},
    Route,
};

use crate::model::auth::LOGGED_IN_COOKIE;

mod gate;
mod pages;

pub use gate::{gate, logged_in_flag, GateDecision};
pub use pages::{resolve, Access, Page, Resolved};

pub fn routes() -> Vec<Route> {
    routes![page]
}

#[derive(Responder)]
enum PageResponse {
    Page(status::Custom<RawHtml<String>>),
    Redirect(Redirect),
}

/// The HTML document the client application boots from.
fn shell(page: Page) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html lang=\"en\">\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>{} - Poll Buddy</title>\n\
         </head>\n\
         <body>\n\
         <div id=\"root\" data-page=\"{page:?}\"></div>\n\
         </body>\n\
         </html>\n",
        page.title()
    )
}

/// Where a gate redirect points, with `prevRoute` in the query if given.
fn redirect_target(to: &str, prev_route: Option<&str>) -> String {
    match prev_route {
        Some(prev) => format!("{to}?prevRoute={}", RawStr::new(prev).percent_encode()),
        None => to.to_string(),
    }
}

#[get("/<path..>", rank = 20)]
fn page(path: Segments<'_, Path>, cookies: &CookieJar<'_>) -> Option<PageResponse> {
    // API paths that got this far do not exist; let the API catcher answer.
    if path.clone().next() == Some("api") {
        return None;
    }
    let pathname = format!("/{}", path.collect::<Vec<_>>().join("/"));
    let resolved = resolve(&pathname);

    if let Some(required) = resolved.page.access().required_login() {
        let logged_in = logged_in_flag(cookies.get(LOGGED_IN_COOKIE).map(|c| c.value()));
        if let GateDecision::Redirect { to, prev_route } = gate(required, logged_in, &pathname) {
            debug!("Gated {pathname}, redirecting to {to}");
            return Some(PageResponse::Redirect(Redirect::to(redirect_target(
                to,
                prev_route.as_deref(),
            ))));
        }
    }

    let status = match resolved.page {
        Page::NotFound => Status::NotFound,
        _ => Status::Ok,
    };
    Some(PageResponse::Page(status::Custom(
        status,
        RawHtml(shell(resolved.page)),
    )))
}

#[cfg(test)]
mod tests {
    use rocket::{http::Status, local::asynchronous::Client};

    use super::*;

    async fn title(client: &Client, uri: &str) -> (Status, String) {
        let response = client.get(uri).dispatch().await;
        let status = response.status();
        let body = response.into_string().await.unwrap();
        let start = body.find("<title>").unwrap() + "<title>".len();
        let end = body.find("</title>").unwrap();
        (status, body[start..end].to_string())
    }

    fn prev_route(location: &str) -> String {
        let query = location.strip_prefix("/login?prevRoute=").unwrap();
        RawStr::new(query).percent_decode().unwrap().into_owned()
    }

    #[backend_test]
    async fn public_pages_render(client: Client) {
        assert_eq!(title(&client, "/").await, (Status::Ok, "Home - Poll Buddy".to_string()));
        assert_eq!(title(&client, "/FAQ").await, (Status::Ok, "FAQ - Poll Buddy".to_string()));
        assert_eq!(
            title(&client, "/login").await,
            (Status::Ok, "Login - Poll Buddy".to_string())
        );
    }

    #[backend_test]
    async fn unknown_pages_are_404(client: Client) {
        assert_eq!(
            title(&client, "/no/such/page").await,
            (Status::NotFound, "404 - Poll Buddy".to_string())
        );
    }

    #[backend_test]
    async fn private_pages_redirect_to_login(client: Client) {
        let response = client.get("/pollEditor/abc/edit").dispatch().await;
        assert_eq!(response.status(), Status::SeeOther);
        let location = response.headers().get_one("Location").unwrap();
        assert_eq!(prev_route(location), "/pollEditor/abc/edit");
    }

    #[backend_test(user)]
    async fn logged_in_users_skip_login_pages(client: Client) {
        let response = client.get("/register/school").dispatch().await;
        assert_eq!(response.status(), Status::SeeOther);
        assert_eq!(response.headers().get_one("Location"), Some("/"));

        assert_eq!(
            title(&client, "/groups/polls").await,
            (Status::Ok, "Polls - Poll Buddy".to_string())
        );
    }

    #[test]
    fn redirect_targets() {
        assert_eq!(redirect_target("/", None), "/");
        let target = redirect_target("/login", Some("/groups/new"));
        assert_eq!(prev_route(&target), "/groups/new");
    }
}
