use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::server::AppState;

use super::accounts::{
    account_statistics, create_account, delete_account, get_account, list_accounts, send_mail,
    test_account, update_account,
};
use super::contacts::{
    add_tag_to_contact, create_contact, delete_contact, get_contact, list_contacts,
    remove_tag_from_contact, update_contact,
};
use super::customers::{
    create_customer, customer_statistics, delete_customer, get_customer, list_customers,
    update_customer, update_customer_email_count, update_customer_progress,
};
use super::discovery::{discover_companies, discover_contacts};
use super::health::health;
use super::tags::{create_tag, delete_tag, list_tags, update_tag};
use super::templates::{
    batch_preview_template, create_template, delete_template, get_template, list_templates,
    render_template, template_variables, update_template,
};

pub fn api_routes() -> Router<AppState> {
    Router::new()
        // Health
        .route("/health", get(health))
        .nest(
            "/api/v1",
            Router::new()
                // Contacts (static /tags routes take priority over /{id})
                .route("/contacts", get(list_contacts).post(create_contact))
                .route("/contacts/tags", get(list_tags).post(create_tag))
                .route(
                    "/contacts/tags/{tag_id}",
                    axum::routing::put(update_tag).delete(delete_tag),
                )
                .route(
                    "/contacts/{id}",
                    get(get_contact).put(update_contact).delete(delete_contact),
                )
                .route(
                    "/contacts/{id}/tags/{tag_id}",
                    post(add_tag_to_contact).delete(remove_tag_from_contact),
                )
                // Customers
                .route("/customers", get(list_customers).post(create_customer))
                .route("/customers/statistics/overview", get(customer_statistics))
                .route(
                    "/customers/{id}",
                    get(get_customer)
                        .put(update_customer)
                        .delete(delete_customer),
                )
                .route("/customers/{id}/progress", patch(update_customer_progress))
                .route(
                    "/customers/{id}/email-count",
                    patch(update_customer_email_count),
                )
                // Email templates
                .route(
                    "/email-templates",
                    get(list_templates).post(create_template),
                )
                .route("/email-templates/batch-preview", post(batch_preview_template))
                .route(
                    "/email-templates/{id}",
                    get(get_template)
                        .put(update_template)
                        .delete(delete_template),
                )
                .route("/email-templates/{id}/render", post(render_template))
                .route("/email-templates/{id}/variables", get(template_variables))
                // Email accounts
                .route("/email-accounts", get(list_accounts).post(create_account))
                .route(
                    "/email-accounts/statistics/overview",
                    get(account_statistics),
                )
                .route(
                    "/email-accounts/{id}",
                    get(get_account).put(update_account).delete(delete_account),
                )
                .route("/email-accounts/{id}/test", post(test_account))
                .route("/email-accounts/{id}/send", post(send_mail))
                // Discovery
                .route("/discovery/contacts", get(discover_contacts))
                .route("/discovery/companies", get(discover_companies)),
        )
}
