use leptos::prelude::*;
use leptos_router::components::{Route, Router, Routes};
use leptos_router::path;

use crate::dashboards::FinancialOverviewDashboard;
use crate::domain::a001_ai_assistant::ui::chat::ChatPage;
use crate::layout::Shell;
use crate::pages::{HomePage, NotFound};

#[component]
pub fn AppRoutes() -> impl IntoView {
    view! {
        <Router>
            <Shell>
                <Routes fallback=|| view! { <NotFound /> }>
                    <Route path=path!("/") view=HomePage />
                    <Route path=path!("/dashboard") view=FinancialOverviewDashboard />
                    <Route path=path!("/chat") view=ChatPage />
                </Routes>
            </Shell>
        </Router>
    }
}
