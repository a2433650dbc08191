//! Restaurant manager pages: overview, new restaurant, new menu items.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::Form;
use maud::{Markup, html};
use serde::Deserialize;
use tavola_api::RequestDescriptor;
use tavola_core::form::{
    MAX_RESTAURANT_IMAGES, MenuForm, MenuItemInput, RestaurantForm, ValidationErrors,
};
use tavola_core::restaurant::{Dish, Restaurant, format_price};
use tracing::info;

use super::Maud;
use crate::error::{LoginRequiredSnafu, RequestResult};
use crate::session::SessionContext;
use crate::{LOG_TARGET, SharedState, UiState};

const MAX_MENU_ROWS: usize = 20;

/// Forms below need someone to attribute the change to.
fn require_login(session: &SessionContext, redirect: String) -> RequestResult<()> {
    if session.user().is_none() {
        return LoginRequiredSnafu {
            redirect: Some(redirect),
        }
        .fail();
    }
    Ok(())
}

pub async fn get_admin(
    state: State<SharedState>,
    session: SessionContext,
    Path(id): Path<String>,
) -> RequestResult<impl IntoResponse> {
    let id_enc = urlencoding::encode(&id);
    let (restaurant, menu) = tokio::join!(
        state.api.request::<Restaurant, _>(
            &session,
            RequestDescriptor::get(format!("api/restaurant/{id_enc}")).bearer(),
        ),
        state.api.request::<Vec<Dish>, _>(
            &session,
            RequestDescriptor::get(format!("api/restaurant/menu/{id_enc}")).bearer(),
        ),
    );

    let (Ok(restaurant), Ok(menu)) = (restaurant, menu) else {
        let content = html! { div ."o-notice" { "Error loading restaurant data" } };
        return Ok(Maud(state.render_html_page("Admin", &session, content)));
    };

    let content = html! {
        h1 ."o-pageTitle" { "Restaurant Admin Panel" }

        section ."o-adminSection" {
            h2 { "Restaurant Details" }
            div ."o-card" {
                h3 ."o-card__title" { (restaurant.name) }
                @if let Some(description) = &restaurant.description {
                    p ."o-card__description" { (description) }
                }
                dl ."o-details" {
                    dt { "Address" }
                    dd { (restaurant.address.one_line()) }
                    dt { "Contact" }
                    dd {
                        (restaurant.contact_information.phone_number)
                        " | "
                        (restaurant.contact_information.email)
                    }
                    dt { "Cuisine" }
                    dd { (restaurant.cuisine.join(", ")) }
                    dt { "Rating" }
                    dd { (restaurant.rating_summary()) }
                    dt { "Opening Hours" }
                    dd { (restaurant.opening_hours) }
                    dt { "Status" }
                    dd { (UiState::render_badge(restaurant.status_label(), restaurant.opened)) }
                }
            }
        }

        section ."o-adminSection" {
            h2 { "Restaurant Status" }
            div ."o-card" {
                p { "Current status: " (restaurant.status_label()) }
            }
        }

        section ."o-adminSection" {
            h2 { "Menu Management" }
            div ."o-card" {
                a ."u-button" href={ "/admin/" (id_enc) "/menu" } { "Add Menu Items" }
                div ."o-menuGrid" {
                    @for dish in &menu {
                        (render_dish(dish))
                    }
                }
            }
        }
    };

    Ok(Maud(state.render_html_page(
        &format!("Admin - {}", restaurant.name),
        &session,
        content,
    )))
}

fn render_dish(dish: &Dish) -> Markup {
    html! {
        div ."o-dish" {
            h3 ."o-dish__name" { (dish.name) }
            p ."o-dish__description" { (dish.description) }
            p { "Price: " (format_price(dish.price)) }
            p { "Calories: " (dish.kcal) " kcal" }
            p {
                (UiState::render_badge(
                    if dish.is_veg { "Vegetarian" } else { "Non-Vegetarian" },
                    dish.is_veg,
                ))
            }
            p {
                (UiState::render_badge(
                    if dish.is_available { "Available" } else { "Unavailable" },
                    dish.is_available,
                ))
            }
        }
    }
}

pub async fn get_new_restaurant(
    state: State<SharedState>,
    session: SessionContext,
) -> RequestResult<impl IntoResponse> {
    require_login(&session, "admin/restaurant/new".into())?;

    let form = render_restaurant_form(&RestaurantForm::default(), &ValidationErrors::default(), None);
    Ok(Maud(state.render_html_page("Add New Restaurant", &session, form)))
}

pub async fn post_new_restaurant(
    state: State<SharedState>,
    session: SessionContext,
    Form(form): Form<RestaurantForm>,
) -> RequestResult<Response> {
    require_login(&session, "admin/restaurant/new".into())?;

    let invalid = |errors: &ValidationErrors, alert: Option<&str>| {
        let content = render_restaurant_form(&form, errors, alert);
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Maud(state.render_html_page("Add New Restaurant", &session, content)),
        )
            .into_response()
    };

    let restaurant = match form.validate() {
        Ok(restaurant) => restaurant,
        Err(errors) => return Ok(invalid(&errors, None)),
    };

    let res = state
        .api
        .request::<serde_json::Value, _>(
            &session,
            RequestDescriptor::post("api/restaurant/admin", &restaurant).bearer(),
        )
        .await;

    if res.is_err() {
        return Ok(invalid(&ValidationErrors::default(), Some("Cannot add Restaurant")));
    }

    info!(target: LOG_TARGET, name = %restaurant.name, "Restaurant added");
    Ok(Redirect::to("/").into_response())
}

fn render_restaurant_form(
    form: &RestaurantForm,
    errors: &ValidationErrors,
    alert: Option<&str>,
) -> Markup {
    let input = |label: &str, name: &str, kind: &str, value: &str, placeholder: &str| {
        UiState::render_input(label, name, kind, value, placeholder, errors.get(name))
    };
    let images = (0..MAX_RESTAURANT_IMAGES).map(|i| form.images.get(i).map(String::as_str).unwrap_or_default());

    html! {
        h1 ."o-pageTitle" { "Add New Restaurant" }
        (UiState::render_form_alert(alert))
        form ."o-form" method="post" action="/admin/restaurant/new" {
            (input("Restaurant Name", "name", "text", &form.name, "Restaurant Name"))
            label ."o-form__field" {
                span ."o-form__label" { "Description" }
                textarea ."o-form__input" name="description" placeholder="Restaurant Description" {
                    (form.description)
                }
            }
            (input("Cuisine Types", "cuisine", "text", &form.cuisine, "Italian, Chinese, Vegan"))
            p ."o-form__hint" { "Enter cuisine types separated by commas" }

            h2 { "Address" }
            (input("Street", "street", "text", &form.street, "Street Address"))
            div ."o-form__row" {
                (input("City", "city", "text", &form.city, "City"))
                (input("State", "state", "text", &form.state, "State"))
                (input("Zip Code", "zip_code", "text", &form.zip_code, "Zip Code"))
            }

            h2 { "Contact Information" }
            (input("Phone Number", "phone_number", "tel", &form.phone_number, "Phone Number"))
            (input("Email", "email", "email", &form.email, "Email"))

            (input(
                "Opening Hours",
                "opening_hours",
                "text",
                &form.opening_hours,
                "e.g., Mon-Fri: 9AM-10PM, Sat-Sun: 10AM-11PM",
            ))

            h2 { "Location" }
            div ."o-form__row" {
                (input("Latitude", "latitude", "number", &form.latitude, "Latitude"))
                (input("Longitude", "longitude", "number", &form.longitude, "Longitude"))
            }

            h2 { "Images" }
            (UiState::render_field_error(errors.get("images")))
            @for (i, image) in images.enumerate() {
                label ."o-form__field" {
                    span ."o-form__label" { "Image URL " (i + 1) }
                    input ."o-form__input" type="url" name="images" value=(image)
                        placeholder="https://example.com/image.jpg";
                    (UiState::render_field_error(errors.get(&format!("images.{i}"))))
                }
            }
            p ."o-form__hint" { "Up to 5 images, leave unused fields empty" }

            button ."u-button -wide" type="submit" { "Add Restaurant" }
        }
    }
}

#[derive(Deserialize)]
pub struct MenuRowsQuery {
    rows: Option<usize>,
}

pub async fn get_menu_form(
    state: State<SharedState>,
    session: SessionContext,
    Path(id): Path<String>,
    Query(query): Query<MenuRowsQuery>,
) -> RequestResult<impl IntoResponse> {
    require_login(&session, format!("admin/{}/menu", urlencoding::encode(&id)))?;

    let rows = query.rows.unwrap_or(1).clamp(1, MAX_MENU_ROWS);
    let rows = vec![MenuItemInput::default(); rows];
    let content = render_menu_form(&id, &rows, &ValidationErrors::default(), None);
    Ok(Maud(state.render_html_page("Add Menu Items", &session, content)))
}

pub async fn post_menu_form(
    state: State<SharedState>,
    session: SessionContext,
    Path(id): Path<String>,
    Form(form): Form<MenuForm>,
) -> RequestResult<Response> {
    require_login(&session, format!("admin/{}/menu", urlencoding::encode(&id)))?;

    let invalid = |errors: &ValidationErrors, alert: Option<&str>| {
        let content = render_menu_form(&id, &form.rows(), errors, alert);
        (
            StatusCode::UNPROCESSABLE_ENTITY,
            Maud(state.render_html_page("Add Menu Items", &session, content)),
        )
            .into_response()
    };

    let menu = match form.validate(&id) {
        Ok(menu) => menu,
        Err(errors) => return Ok(invalid(&errors, None)),
    };

    let res = state
        .api
        .request::<serde_json::Value, _>(
            &session,
            RequestDescriptor::post("api/restaurant/menu/", &menu).bearer(),
        )
        .await;

    if let Err(err) = res {
        return Ok(invalid(&ValidationErrors::default(), Some(&err.to_string())));
    }

    info!(target: LOG_TARGET, restaurant = %id, items = menu.menu.len(), "Menu items added");
    Ok(Redirect::to(&format!("/admin/{}", urlencoding::encode(&id))).into_response())
}

fn render_menu_form(
    restaurant_id: &str,
    rows: &[MenuItemInput],
    errors: &ValidationErrors,
    alert: Option<&str>,
) -> Markup {
    let id_enc = urlencoding::encode(restaurant_id);
    let row_count = rows.len();

    html! {
        h1 ."o-pageTitle" { "Add Menu Items for Restaurant " (restaurant_id) }
        (UiState::render_form_alert(alert))
        (UiState::render_field_error(errors.get("menu")))
        form ."o-form" method="post" action={ "/admin/" (id_enc) "/menu" } {
            @for (i, row) in rows.iter().enumerate() {
                (render_menu_row(i, row, errors))
            }
            div ."o-form__row" {
                @if row_count < MAX_MENU_ROWS {
                    a ."u-button -outline" href={ "/admin/" (id_enc) "/menu?rows=" (row_count + 1) } {
                        "Add Another Menu Item"
                    }
                }
                @if 1 < row_count {
                    a ."u-button -outline" href={ "/admin/" (id_enc) "/menu?rows=" (row_count - 1) } {
                        "Remove Last Item"
                    }
                }
            }
            button ."u-button -wide" type="submit" { "Add Menu Items" }
        }
    }
}

fn render_menu_row(i: usize, row: &MenuItemInput, errors: &ValidationErrors) -> Markup {
    let error = |column: &str| errors.get(&format!("menu.{i}.{column}"));
    let input = |label: &str, column: &str, kind: &str, value: &str, placeholder: &str| {
        UiState::render_input(label, column, kind, value, placeholder, error(column))
    };

    html! {
        fieldset ."o-menuItem" {
            legend { "Menu Item " (i + 1) }
            (input("Name", "name", "text", &row.name, "Dish name"))
            label ."o-form__field" {
                span ."o-form__label" { "Vegetarian" }
                select ."o-form__input" name="is_veg" {
                    option value="false" selected[!row.is_veg] { "No" }
                    option value="true" selected[row.is_veg] { "Yes" }
                }
            }
            (input("Calories (kcal)", "kcal", "number", &row.kcal, "0"))
            (input("Description", "description", "text", &row.description, "Describe the dish"))
            (input("Image URL", "image_url", "url", &row.image_url, "https://example.com/dish.jpg"))
            (input("Price", "price", "number", &row.price, "0"))
            label ."o-form__field" {
                span ."o-form__label" { "Available" }
                select ."o-form__input" name="is_available" {
                    option value="true" selected[row.is_available] { "Yes" }
                    option value="false" selected[!row.is_available] { "No" }
                }
            }
            (input("Category", "category", "text", &row.category, "e.g. Pizza"))
        }
    }
}
