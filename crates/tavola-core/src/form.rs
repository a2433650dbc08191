//! Input validation for the forms the UI renders.
//!
//! Each `*Form` is what the browser posts. `validate` either produces the
//! body the backend expects or every field problem at once, keyed by the
//! field name used in the markup (`images.2`, `menu.0.price`).

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::Role;
use crate::auth::{LoginRequest, SignupRequest};
use crate::restaurant::ContactInformation;

pub const MAX_RESTAURANT_IMAGES: usize = 5;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: String,
    pub message: &'static str,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ValidationErrors {
    errors: Vec<FieldError>,
}

pub type ValidationResult<T> = std::result::Result<T, ValidationErrors>;

impl ValidationErrors {
    fn check(&mut self, ok: bool, field: impl Into<String>, message: &'static str) {
        if !ok {
            self.errors.push(FieldError {
                field: field.into(),
                message,
            });
        }
    }

    /// First problem reported for `field`.
    pub fn get(&self, field: &str) -> Option<&'static str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message)
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    fn finish<T>(self, value: impl FnOnce() -> T) -> ValidationResult<T> {
        if self.is_empty() {
            Ok(value())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, e) in self.errors.iter().enumerate() {
            if 0 < i {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", e.field, e.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

pub fn is_valid_email(s: &str) -> bool {
    let Some((local, domain)) = s.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.contains('@')
        && !s.chars().any(char::is_whitespace)
        && 2 <= domain.split('.').count()
        && domain.split('.').all(|label| !label.is_empty())
}

fn is_valid_url(s: &str) -> bool {
    Url::parse(s).is_ok()
}

fn at_least_chars(s: &str, n: usize) -> bool {
    n <= s.chars().count()
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

impl LoginForm {
    pub fn validate(&self) -> ValidationResult<LoginRequest> {
        let mut errors = ValidationErrors::default();
        errors.check(
            is_valid_email(&self.email),
            "email",
            "Please enter a valid email address",
        );
        errors.check(
            !self.password.is_empty(),
            "password",
            "Password is required",
        );
        errors.finish(|| LoginRequest {
            email: self.email.clone(),
            password: self.password.clone(),
        })
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct SignupForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
    #[serde(default)]
    pub role: String,
}

impl SignupForm {
    pub fn validate(&self) -> ValidationResult<SignupRequest> {
        let mut errors = ValidationErrors::default();
        errors.check(
            is_valid_email(&self.email),
            "email",
            "Please enter a valid email address",
        );
        errors.check(
            at_least_chars(&self.password, 7),
            "password",
            "Password must be at least 7 characters long",
        );
        errors.check(
            at_least_chars(&self.confirm_password, 7),
            "confirm_password",
            "Please confirm your password",
        );
        errors.check(
            self.password == self.confirm_password,
            "confirm_password",
            "Passwords don't match",
        );
        let role = self.role.parse::<Role>().ok();
        errors.check(role.is_some(), "role", "Please select a user type");

        match role {
            Some(role) => errors.finish(|| SignupRequest {
                email: self.email.clone(),
                password: self.password.clone(),
                role,
            }),
            None => Err(errors),
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct RestaurantForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Comma separated
    #[serde(default)]
    pub cuisine: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub phone_number: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub opening_hours: String,
    #[serde(default)]
    pub latitude: String,
    #[serde(default)]
    pub longitude: String,
    #[serde(default)]
    pub images: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewRestaurant {
    pub name: String,
    pub description: Option<String>,
    pub address: NewAddress,
    pub opening_hours: String,
    pub cuisine: Vec<String>,
    pub images: Vec<String>,
    pub contact_information: ContactInformation,
    pub location: NewLocation,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAddress {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NewLocation {
    pub latitude: f64,
    pub longitude: f64,
}

fn parse_coordinate(
    errors: &mut ValidationErrors,
    field: &'static str,
    raw: &str,
    limit: f64,
    range_message: &'static str,
) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => {
            errors.check((-limit..=limit).contains(&v), field, range_message);
            v
        }
        _ => {
            errors.check(false, field, "Must be a number");
            0.0
        }
    }
}

impl RestaurantForm {
    pub fn cuisines(&self) -> Vec<String> {
        self.cuisine
            .split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(ToOwned::to_owned)
            .collect()
    }

    pub fn validate(&self) -> ValidationResult<NewRestaurant> {
        let mut errors = ValidationErrors::default();
        let required = [
            ("name", &self.name, "Restaurant name is required"),
            ("street", &self.street, "Street is required"),
            ("city", &self.city, "City is required"),
            ("state", &self.state, "State is required"),
            ("zip_code", &self.zip_code, "Zip code is required"),
            ("phone_number", &self.phone_number, "Phone number is required"),
            ("opening_hours", &self.opening_hours, "Opening hours are required"),
        ];
        for (field, value, message) in required {
            errors.check(!value.trim().is_empty(), field, message);
        }

        let cuisine = self.cuisines();
        errors.check(
            !cuisine.is_empty(),
            "cuisine",
            "At least one cuisine type is required",
        );
        errors.check(
            is_valid_email(&self.email),
            "email",
            "Invalid email address",
        );

        let mut images = vec![];
        for (i, image) in self.images.iter().enumerate() {
            let image = image.trim();
            if image.is_empty() {
                continue;
            }
            errors.check(is_valid_url(image), format!("images.{i}"), "Invalid URL");
            images.push(image.to_owned());
        }
        errors.check(
            !images.is_empty(),
            "images",
            "At least one image URL is required",
        );
        errors.check(
            images.len() <= MAX_RESTAURANT_IMAGES,
            "images",
            "Maximum 5 images allowed",
        );

        let latitude = parse_coordinate(
            &mut errors,
            "latitude",
            &self.latitude,
            90.0,
            "Latitude must be between -90 and 90",
        );
        let longitude = parse_coordinate(
            &mut errors,
            "longitude",
            &self.longitude,
            180.0,
            "Longitude must be between -180 and 180",
        );

        errors.finish(|| NewRestaurant {
            name: self.name.trim().to_owned(),
            description: Some(self.description.trim())
                .filter(|d| !d.is_empty())
                .map(ToOwned::to_owned),
            address: NewAddress {
                street: self.street.trim().to_owned(),
                city: self.city.trim().to_owned(),
                state: self.state.trim().to_owned(),
                zip_code: self.zip_code.trim().to_owned(),
            },
            opening_hours: self.opening_hours.trim().to_owned(),
            cuisine,
            images,
            contact_information: ContactInformation {
                phone_number: self.phone_number.trim().to_owned(),
                email: self.email.clone(),
            },
            location: NewLocation {
                latitude,
                longitude,
            },
        })
    }
}

/// Menu rows are posted as repeated keys, one value per row for every
/// column (`name=..&name=..&price=..&price=..`).
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MenuForm {
    #[serde(default)]
    pub name: Vec<String>,
    #[serde(default)]
    pub is_veg: Vec<String>,
    #[serde(default)]
    pub kcal: Vec<String>,
    #[serde(default)]
    pub description: Vec<String>,
    #[serde(default)]
    pub image_url: Vec<String>,
    #[serde(default)]
    pub price: Vec<String>,
    #[serde(default)]
    pub is_available: Vec<String>,
    #[serde(default)]
    pub category: Vec<String>,
}

/// One row of [`MenuForm`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuItemInput {
    pub name: String,
    pub is_veg: bool,
    pub kcal: String,
    pub description: String,
    pub image_url: String,
    pub price: String,
    pub is_available: bool,
    pub category: String,
}

impl Default for MenuItemInput {
    fn default() -> Self {
        Self {
            name: String::new(),
            is_veg: false,
            kcal: "0".into(),
            description: String::new(),
            image_url: String::new(),
            price: "0".into(),
            is_available: true,
            category: String::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewMenu {
    pub restaurant_id: String,
    pub menu: Vec<NewDish>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDish {
    pub name: String,
    pub is_veg: bool,
    pub kcal: f64,
    pub description: String,
    pub price: f64,
    pub is_available: bool,
    pub images: Vec<String>,
}

impl MenuForm {
    pub fn rows(&self) -> Vec<MenuItemInput> {
        let columns = [
            self.name.len(),
            self.is_veg.len(),
            self.kcal.len(),
            self.description.len(),
            self.image_url.len(),
            self.price.len(),
            self.is_available.len(),
            self.category.len(),
        ];
        let len = columns.into_iter().max().unwrap_or_default();
        let cell = |column: &[String], i: usize| column.get(i).cloned().unwrap_or_default();
        let flag = |column: &[String], i: usize, default: bool| {
            column.get(i).map(|v| v == "true").unwrap_or(default)
        };

        (0..len)
            .map(|i| MenuItemInput {
                name: cell(&self.name, i),
                is_veg: flag(&self.is_veg, i, false),
                kcal: cell(&self.kcal, i),
                description: cell(&self.description, i),
                image_url: cell(&self.image_url, i),
                price: cell(&self.price, i),
                is_available: flag(&self.is_available, i, true),
                category: cell(&self.category, i),
            })
            .collect()
    }

    pub fn validate(&self, restaurant_id: &str) -> ValidationResult<NewMenu> {
        let rows = self.rows();
        let mut errors = ValidationErrors::default();
        errors.check(
            !rows.is_empty(),
            "menu",
            "At least one menu item is required.",
        );

        let mut menu = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            errors.check(
                at_least_chars(row.name.trim(), 2),
                format!("menu.{i}.name"),
                "Name must be at least 2 characters.",
            );
            let kcal = row.kcal.trim().parse::<f64>().ok().filter(|k| 0.0 <= *k);
            errors.check(
                kcal.is_some(),
                format!("menu.{i}.kcal"),
                "Calories must be a positive number.",
            );
            errors.check(
                at_least_chars(row.description.trim(), 10),
                format!("menu.{i}.description"),
                "Description must be at least 10 characters.",
            );
            errors.check(
                is_valid_url(row.image_url.trim()),
                format!("menu.{i}.image_url"),
                "Must be a valid URL.",
            );
            let price = row
                .price
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|p| p.is_finite() && 0.0 < *p);
            errors.check(
                price.is_some(),
                format!("menu.{i}.price"),
                "Price must be a positive number.",
            );
            errors.check(
                !row.category.trim().is_empty(),
                format!("menu.{i}.category"),
                "Category is required.",
            );

            menu.push(NewDish {
                name: row.name.trim().to_owned(),
                is_veg: row.is_veg,
                kcal: kcal.unwrap_or_default(),
                description: row.description.trim().to_owned(),
                price: price.unwrap_or_default(),
                is_available: row.is_available,
                images: vec![row.image_url.trim().to_owned()],
            });
        }

        errors.finish(|| NewMenu {
            restaurant_id: restaurant_id.to_owned(),
            menu,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_check() {
        assert!(is_valid_email("a@b.com"));
        assert!(is_valid_email("first.last@sub.example.org"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("@b.com"));
        assert!(!is_valid_email("a@@b.com"));
        assert!(!is_valid_email("a b@c.com"));
        assert!(!is_valid_email("a@b..com"));
    }

    #[test]
    fn login_requires_email_and_password() {
        let errors = LoginForm::default().validate().unwrap_err();
        assert_eq!(errors.get("email"), Some("Please enter a valid email address"));
        assert_eq!(errors.get("password"), Some("Password is required"));

        let ok = LoginForm {
            email: "a@b.com".into(),
            password: "x".into(),
        }
        .validate()
        .unwrap();
        assert_eq!(ok.email, "a@b.com");
    }

    #[test]
    fn signup_checks_password_confirmation_and_role() {
        let form = SignupForm {
            email: "a@b.com".into(),
            password: "secret12".into(),
            confirm_password: "secret13".into(),
            role: "CHEF".into(),
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("confirm_password"), Some("Passwords don't match"));
        assert_eq!(errors.get("role"), Some("Please select a user type"));
        assert_eq!(errors.get("password"), None);

        let short = SignupForm {
            password: "abc".into(),
            confirm_password: "abc".into(),
            role: "CUSTOMER".into(),
            ..form.clone()
        };
        let errors = short.validate().unwrap_err();
        assert_eq!(
            errors.get("password"),
            Some("Password must be at least 7 characters long")
        );

        let ok = SignupForm {
            confirm_password: "secret12".into(),
            role: "RESTAURANT_MANAGER".into(),
            ..form
        }
        .validate()
        .unwrap();
        assert_eq!(ok.role, Role::RestaurantManager);
    }

    fn restaurant_form() -> RestaurantForm {
        RestaurantForm {
            name: "Trattoria".into(),
            description: "".into(),
            cuisine: " Italian, ,Vegan ".into(),
            street: "Via Roma 1".into(),
            city: "Milan".into(),
            state: "MI".into(),
            zip_code: "20100".into(),
            phone_number: "+39 02 1234".into(),
            email: "ciao@trattoria.it".into(),
            opening_hours: "Mon-Fri: 9AM-10PM".into(),
            latitude: "45.46".into(),
            longitude: "9.19".into(),
            images: vec!["https://img.example/1.jpg".into(), "".into()],
        }
    }

    #[test]
    fn restaurant_form_builds_backend_body() {
        let new = restaurant_form().validate().unwrap();
        assert_eq!(new.cuisine, vec!["Italian", "Vegan"]);
        assert_eq!(new.images, vec!["https://img.example/1.jpg"]);
        assert_eq!(new.description, None);

        let json = serde_json::to_value(&new).unwrap();
        assert_eq!(json["address"]["zipCode"], "20100");
        assert_eq!(json["contactInformation"]["phoneNumber"], "+39 02 1234");
        assert_eq!(json["openingHours"], "Mon-Fri: 9AM-10PM");
        assert_eq!(json["location"]["latitude"], 45.46);
    }

    #[test]
    fn restaurant_form_reports_images_and_coordinates() {
        let form = RestaurantForm {
            images: vec!["".into(), "not a url".into()],
            latitude: "91".into(),
            longitude: "east".into(),
            ..restaurant_form()
        };
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.get("images.1"), Some("Invalid URL"));
        assert_eq!(errors.get("latitude"), Some("Latitude must be between -90 and 90"));
        assert_eq!(errors.get("longitude"), Some("Must be a number"));

        let none = RestaurantForm {
            images: vec![],
            ..restaurant_form()
        };
        assert_eq!(
            none.validate().unwrap_err().get("images"),
            Some("At least one image URL is required")
        );

        let too_many = RestaurantForm {
            images: (0..6).map(|i| format!("https://img.example/{i}.jpg")).collect(),
            ..restaurant_form()
        };
        assert_eq!(
            too_many.validate().unwrap_err().get("images"),
            Some("Maximum 5 images allowed")
        );
    }

    #[test]
    fn menu_rows_are_zipped_from_columns() {
        let form = MenuForm {
            name: vec!["Margherita".into(), "X".into()],
            is_veg: vec!["true".into(), "false".into()],
            kcal: vec!["800".into(), "-1".into()],
            description: vec!["Tomato, mozzarella, basil".into(), "short".into()],
            image_url: vec!["https://img.example/p.jpg".into(), "nope".into()],
            price: vec!["8.5".into(), "0".into()],
            is_available: vec!["true".into(), "false".into()],
            category: vec!["Pizza".into(), "".into()],
        };
        let rows = form.rows();
        assert_eq!(rows.len(), 2);
        assert!(rows[0].is_veg);
        assert!(!rows[1].is_available);

        let errors = form.validate("r1").unwrap_err();
        assert_eq!(errors.get("menu.0.name"), None);
        assert_eq!(errors.get("menu.1.name"), Some("Name must be at least 2 characters."));
        assert_eq!(errors.get("menu.1.kcal"), Some("Calories must be a positive number."));
        assert_eq!(
            errors.get("menu.1.description"),
            Some("Description must be at least 10 characters.")
        );
        assert_eq!(errors.get("menu.1.image_url"), Some("Must be a valid URL."));
        assert_eq!(errors.get("menu.1.price"), Some("Price must be a positive number."));
        assert_eq!(errors.get("menu.1.category"), Some("Category is required."));
    }

    #[test]
    fn valid_menu_becomes_backend_body() {
        let form = MenuForm {
            name: vec!["Margherita".into()],
            is_veg: vec!["true".into()],
            kcal: vec!["800".into()],
            description: vec!["Tomato, mozzarella, basil".into()],
            image_url: vec!["https://img.example/p.jpg".into()],
            price: vec!["8.5".into()],
            is_available: vec!["false".into()],
            category: vec!["Pizza".into()],
        };
        let menu = form.validate("r1").unwrap();
        let json = serde_json::to_value(&menu).unwrap();
        assert_eq!(json["restaurantId"], "r1");
        assert_eq!(json["menu"][0]["isVeg"], true);
        assert_eq!(json["menu"][0]["isAvailable"], false);
        assert_eq!(json["menu"][0]["images"][0], "https://img.example/p.jpg");

        assert_eq!(
            MenuForm::default().validate("r1").unwrap_err().get("menu"),
            Some("At least one menu item is required.")
        );
    }
}
