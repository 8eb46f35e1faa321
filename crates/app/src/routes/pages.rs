//! Landing pages behind the auth guard. Their content is served by the
//! backend's own views; these only hold the route.

use dioxus::prelude::*;

#[component]
fn Placeholder(title: &'static str) -> Element {
    rsx! {
        h2 { "{title}" }
        p { class: "placeholder-note", "Coming soon." }
    }
}

#[component]
pub fn EmployeeDashboard() -> Element {
    rsx! { Placeholder { title: "Employee Dashboard" } }
}

#[component]
pub fn EmployeeCalls() -> Element {
    rsx! { Placeholder { title: "Calls" } }
}

#[component]
pub fn EmployeePayments() -> Element {
    rsx! { Placeholder { title: "Payments" } }
}

#[component]
pub fn EmployeeIncentives() -> Element {
    rsx! { Placeholder { title: "Incentives" } }
}

#[component]
pub fn ManagerDashboard() -> Element {
    rsx! { Placeholder { title: "Manager Dashboard" } }
}

#[component]
pub fn ManagerPayments() -> Element {
    rsx! { Placeholder { title: "Team Payments" } }
}

#[component]
pub fn ManagerWhatsapp() -> Element {
    rsx! { Placeholder { title: "WhatsApp" } }
}

#[component]
pub fn ManagerAnalytics() -> Element {
    rsx! { Placeholder { title: "Analytics" } }
}

#[component]
pub fn AdminUsers() -> Element {
    rsx! { Placeholder { title: "Users" } }
}

#[component]
pub fn AdminMaster() -> Element {
    rsx! { Placeholder { title: "Master Data" } }
}
