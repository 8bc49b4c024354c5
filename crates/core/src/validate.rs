#![forbid(unsafe_code)]

//! Client-side draft validation. Runs before any request is dispatched and reports
//! per-field messages; it never touches store state.

use crate::model::{BranchDraft, BranchPatch, BuildingDraft, BuildingPatch, FloorDraft, SpaceDraft};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FieldErrors {
    errors: Vec<FieldError>,
}

impl FieldErrors {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }

    /// First message reported for `field`.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|err| err.field == field)
            .map(|err| err.message.as_str())
    }

    pub fn into_result(self) -> Result<(), Self> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (index, err) in self.errors.iter().enumerate() {
            if index > 0 {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", err.field, err.message)?;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

pub trait Validate {
    fn validate(&self) -> Result<(), FieldErrors>;
}

fn require(errors: &mut FieldErrors, field: &'static str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.push(field, message);
    }
}

fn require_opt(errors: &mut FieldErrors, field: &'static str, value: Option<&str>, message: &str) {
    require(errors, field, value.unwrap_or(""), message);
}

pub fn is_valid_email(value: &str) -> bool {
    let value = value.trim();
    if value.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let Some((host, tld)) = domain.rsplit_once('.') else {
        return false;
    };
    !host.is_empty() && !tld.is_empty()
}

fn check_email(errors: &mut FieldErrors, value: &str) {
    if !is_valid_email(value) {
        errors.push("email", "Invalid email format");
    }
}

fn check_phone(errors: &mut FieldErrors, value: &str) {
    if value.trim().chars().count() < 10 {
        errors.push("phone", "Phone number is required");
    }
}

fn check_coordinates(errors: &mut FieldErrors, latitude: Option<f64>, longitude: Option<f64>) {
    if let Some(lat) = latitude
        && !(lat.is_finite() && (-90.0..=90.0).contains(&lat))
    {
        errors.push("latitude", "Latitude must be between -90 and 90");
    }
    if let Some(lon) = longitude
        && !(lon.is_finite() && (-180.0..=180.0).contains(&lon))
    {
        errors.push("longitude", "Longitude must be between -180 and 180");
    }
}

fn check_data_uri(errors: &mut FieldErrors, field: &'static str, value: Option<&str>) {
    let Some(value) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return;
    };
    if !value.starts_with("data:") {
        errors.push(field, "Attachment must be a data: URI");
    }
}

impl Validate for BranchDraft {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        require(&mut errors, "name", &self.name, "Branch name is required");
        require(&mut errors, "manager", &self.manager, "Manager name is required");
        check_email(&mut errors, &self.email);
        check_phone(&mut errors, &self.phone);
        require(&mut errors, "address", &self.address, "Branch address is required");
        require_opt(&mut errors, "city", self.city.as_deref(), "City is required");
        require_opt(&mut errors, "country", self.country.as_deref(), "Country is required");
        check_coordinates(&mut errors, self.latitude, self.longitude);
        errors.into_result()
    }
}

impl Validate for BranchPatch {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        if let Some(name) = &self.name {
            require(&mut errors, "name", name, "Branch name is required");
        }
        if let Some(manager) = &self.manager {
            require(&mut errors, "manager", manager, "Manager name is required");
        }
        if let Some(email) = &self.email {
            check_email(&mut errors, email);
        }
        if let Some(phone) = &self.phone {
            check_phone(&mut errors, phone);
        }
        if let Some(address) = &self.address {
            require(&mut errors, "address", address, "Branch address is required");
        }
        if let Some(city) = &self.city {
            require(&mut errors, "city", city, "City is required");
        }
        if let Some(country) = &self.country {
            require(&mut errors, "country", country, "Country is required");
        }
        check_coordinates(&mut errors, self.latitude, self.longitude);
        errors.into_result()
    }
}

impl Validate for BuildingDraft {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        require(&mut errors, "name", &self.name, "Building name is required");
        require(&mut errors, "type", &self.building_type, "Building type is required");
        require(&mut errors, "address", &self.address, "Address is required");
        if self.floors < 1 {
            errors.push("floors", "Total floors must be at least 1");
        }
        check_coordinates(&mut errors, self.latitude, self.longitude);
        errors.into_result()
    }
}

impl Validate for BuildingPatch {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        if let Some(name) = &self.name {
            require(&mut errors, "name", name, "Building name is required");
        }
        if let Some(building_type) = &self.building_type {
            require(&mut errors, "type", building_type, "Building type is required");
        }
        if let Some(address) = &self.address {
            require(&mut errors, "address", address, "Address is required");
        }
        if self.floors.is_some_and(|floors| floors < 1) {
            errors.push("floors", "Total floors must be at least 1");
        }
        check_coordinates(&mut errors, self.latitude, self.longitude);
        errors.into_result()
    }
}

impl Validate for FloorDraft {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        require(&mut errors, "floorName", &self.floor_name, "Floor name is required");
        if self.floor_number < 0 {
            errors.push("floorNumber", "Floor number must be 0 or higher");
        }
        if !(self.total_area.is_finite() && self.total_area >= 1.0) {
            errors.push("totalArea", "Area must be at least 1 sq ft");
        }
        check_data_uri(&mut errors, "floorPlan", self.floor_plan.as_deref());
        errors.into_result()
    }
}

impl Validate for SpaceDraft {
    fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::default();
        require(&mut errors, "spaceName", &self.space_name, "Space name is required");
        require(&mut errors, "branchName", &self.branch_name, "Branch is required");
        require(&mut errors, "buildingName", &self.building_name, "Building is required");
        require(&mut errors, "floorName", &self.floor_name, "Floor is required");
        require(&mut errors, "metaType", &self.meta_type, "Meta type is required");
        require(&mut errors, "spaceArea", &self.space_area, "Space area is required");
        if let Some(parent) = self.parent_space.as_deref().map(str::trim)
            && !parent.is_empty()
            && parent.eq_ignore_ascii_case(self.space_name.trim())
        {
            errors.push("parentSpace", "A space cannot be its own parent");
        }
        check_data_uri(&mut errors, "spaceImage", self.space_image.as_deref());
        errors.into_result()
    }
}
