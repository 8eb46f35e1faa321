pub mod home;
pub mod login;
pub mod not_found;
pub mod pages;

use crate::auth::{use_auth, use_redirect};
use auth_core::{AuthGate, GateView, SessionController};
use dioxus::prelude::*;
use shared_types::Destination;
use std::cell::RefCell;
use std::rc::Rc;

use home::Home;
use login::Login;
use not_found::NotFound;
use pages::{
    AdminMaster, AdminUsers, EmployeeCalls, EmployeeDashboard, EmployeeIncentives,
    EmployeePayments, ManagerAnalytics, ManagerDashboard, ManagerPayments, ManagerWhatsapp,
};

/// Application routes.
#[derive(Clone, Routable, Debug, PartialEq)]
pub enum Route {
    #[route("/")]
    Home {},
    #[route("/login")]
    Login {},

    #[layout(AuthGuard)]
    #[layout(AppLayout)]
    #[route("/employee/dashboard")]
    EmployeeDashboard {},
    #[route("/employee/calls")]
    EmployeeCalls {},
    #[route("/employee/payments")]
    EmployeePayments {},
    #[route("/employee/incentives")]
    EmployeeIncentives {},
    #[route("/manager/dashboard")]
    ManagerDashboard {},
    #[route("/manager/payments")]
    ManagerPayments {},
    #[route("/manager/whatsapp")]
    ManagerWhatsapp {},
    #[route("/manager/analytics")]
    ManagerAnalytics {},
    #[route("/admin/users")]
    AdminUsers {},
    #[route("/admin/master")]
    AdminMaster {},
    #[end_layout]
    #[end_layout]

    #[route("/:..route")]
    NotFound { route: Vec<String> },
}

impl From<Destination> for Route {
    fn from(destination: Destination) -> Self {
        match destination {
            Destination::Login => Route::Login {},
            Destination::EmployeeLanding => Route::EmployeeDashboard {},
            Destination::ManagerLanding => Route::ManagerDashboard {},
            Destination::AdminLanding => Route::AdminUsers {},
        }
    }
}

/// Auth guard layout: renders its children only while someone is signed in,
/// and sends everyone else to /login.
#[component]
fn AuthGuard() -> Element {
    let auth = use_auth();
    let redirect = use_redirect();
    let mut view = use_signal(|| GateView::Pending);
    let gate: Rc<RefCell<Option<AuthGate>>> = use_hook(|| Rc::new(RefCell::new(None)));

    // Activated after the first render so the initial notification never
    // writes the view signal mid-render.
    let slot = gate.clone();
    use_effect(move || {
        if slot.borrow().is_some() {
            return;
        }
        let activated =
            AuthGate::activate(auth.identity.as_ref(), redirect.clone(), move |next| {
                view.set(next)
            });
        *slot.borrow_mut() = Some(activated);
    });

    use_drop(move || {
        if let Some(active) = gate.borrow_mut().take() {
            active.teardown();
        }
    });

    match view() {
        GateView::Render => rsx! { Outlet::<Route> {} },
        GateView::Redirecting => rsx! {
            div { class: "auth-guard-loading",
                p { "Redirecting to login..." }
            }
        },
        GateView::Pending => rsx! {
            div { class: "auth-guard-loading",
                p { "Loading..." }
            }
        },
    }
}

/// Main app layout with the top navbar.
#[component]
fn AppLayout() -> Element {
    let auth = use_auth();
    let redirect = use_redirect();
    let session = use_hook(move || Rc::new(SessionController::new(auth.identity.clone(), redirect)));

    rsx! {
        nav { class: "navbar-bar",
            Link { to: Route::Home {}, class: "navbar-brand", "Performance Tracker" }
            button {
                class: "navbar-signout",
                onclick: move |_| {
                    let session = session.clone();
                    spawn(async move {
                        session.sign_out().await;
                    });
                },
                "Sign out"
            }
        }
        main { class: "page-content",
            Outlet::<Route> {}
        }
    }
}
