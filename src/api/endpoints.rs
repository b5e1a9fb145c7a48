//! Typed wrappers over the backend's resources.
//!
//! One function per backend operation; paths live here and nowhere else.

use super::{client::ApiClient, session::Session};
use crate::{
    errors::Result,
    models::{
        AdminUser, Complaint, ComplaintStatus, ComplaintStatusUpdate, DeliveryArea,
        DeliveryPeriod, DiscountConfig, Employee, ForemanCustomer, Product, Referral, StockUpdate,
        SupportDashboard, UserAccessUpdate, VehicleType,
    },
};
use serde_json::{Map, Value};

const COMPLAINTS: &str = "/api/complaints";
const EMPLOYEES: &str = "/api/employees";
const AREAS: &str = "/api/areas";
const VEHICLE_TYPES: &str = "/api/vehicle-types";
const DELIVERY_PERIODS: &str = "/api/delivery-periods";
const PRODUCTS: &str = "/api/products";
const DISCOUNTS: &str = "/api/products/discounts";
const FOREMAN_CUSTOMERS: &str = "/api/foreman-customers";
const SUPPORT_DASHBOARD: &str = "/api/support/dashboard";
const USERS: &str = "/api/user-admin/users";
const REFERRALS: &str = "/api/referrals";

// --- Complaints ---

/// All complaints.
pub async fn list_complaints(api: &ApiClient, session: &mut Session) -> Result<Vec<Complaint>> {
    api.get(session, COMPLAINTS).await
}

/// Changes a complaint's status; returns the stored complaint.
pub async fn update_complaint_status(
    api: &ApiClient,
    session: &mut Session,
    id: i64,
    status: ComplaintStatus,
) -> Result<Complaint> {
    api.put(
        session,
        &format!("{COMPLAINTS}/{id}"),
        &ComplaintStatusUpdate { status },
    )
    .await
}

// --- Employees ---

/// All employees.
pub async fn list_employees(api: &ApiClient, session: &mut Session) -> Result<Vec<Employee>> {
    api.get(session, EMPLOYEES).await
}

// --- Delivery areas ---

/// All delivery areas.
pub async fn list_areas(api: &ApiClient, session: &mut Session) -> Result<Vec<DeliveryArea>> {
    api.get(session, AREAS).await
}

/// Creates an area from a validated form object.
pub async fn create_area(
    api: &ApiClient,
    session: &mut Session,
    form: &Map<String, Value>,
) -> Result<DeliveryArea> {
    api.post(session, AREAS, form).await
}

/// Replaces an area.
pub async fn update_area(
    api: &ApiClient,
    session: &mut Session,
    area: &DeliveryArea,
) -> Result<DeliveryArea> {
    api.put(session, &format!("{AREAS}/{}", area.id), area).await
}

/// Deletes an area.
pub async fn delete_area(api: &ApiClient, session: &mut Session, id: i64) -> Result<()> {
    api.delete(session, &format!("{AREAS}/{id}")).await
}

// --- Vehicle types ---

/// All vehicle types.
pub async fn list_vehicle_types(
    api: &ApiClient,
    session: &mut Session,
) -> Result<Vec<VehicleType>> {
    api.get(session, VEHICLE_TYPES).await
}

/// Creates a vehicle type from a validated form object.
pub async fn create_vehicle_type(
    api: &ApiClient,
    session: &mut Session,
    form: &Map<String, Value>,
) -> Result<VehicleType> {
    api.post(session, VEHICLE_TYPES, form).await
}

// --- Delivery periods ---

/// All delivery periods.
pub async fn list_delivery_periods(
    api: &ApiClient,
    session: &mut Session,
) -> Result<Vec<DeliveryPeriod>> {
    api.get(session, DELIVERY_PERIODS).await
}

/// Creates a delivery period.
pub async fn create_delivery_period(
    api: &ApiClient,
    session: &mut Session,
    period: &DeliveryPeriod,
) -> Result<DeliveryPeriod> {
    api.post(session, DELIVERY_PERIODS, period).await
}

/// Deletes a delivery period.
pub async fn delete_delivery_period(api: &ApiClient, session: &mut Session, id: i64) -> Result<()> {
    api.delete(session, &format!("{DELIVERY_PERIODS}/{id}")).await
}

// --- Products, discounts and stock ---

/// All products.
pub async fn list_products(api: &ApiClient, session: &mut Session) -> Result<Vec<Product>> {
    api.get(session, PRODUCTS).await
}

/// Products that carry a discount configuration.
pub async fn list_discounted_products(
    api: &ApiClient,
    session: &mut Session,
) -> Result<Vec<Product>> {
    api.get(session, DISCOUNTS).await
}

/// Replaces a product's discount configuration; returns the stored product.
pub async fn update_discount(
    api: &ApiClient,
    session: &mut Session,
    product_id: i64,
    discount: &DiscountConfig,
) -> Result<Product> {
    api.put(session, &format!("{PRODUCTS}/{product_id}/discount"), discount)
        .await
}

/// Sets a product's stock count; returns the stored product.
pub async fn update_stock(
    api: &ApiClient,
    session: &mut Session,
    product_id: i64,
    update: &StockUpdate,
) -> Result<Product> {
    api.put(session, &format!("{PRODUCTS}/{product_id}/stock"), update)
        .await
}

// --- Directory ---

/// All foreman customers.
pub async fn list_foreman_customers(
    api: &ApiClient,
    session: &mut Session,
) -> Result<Vec<ForemanCustomer>> {
    api.get(session, FOREMAN_CUSTOMERS).await
}

/// All referral codes.
pub async fn list_referrals(api: &ApiClient, session: &mut Session) -> Result<Vec<Referral>> {
    api.get(session, REFERRALS).await
}

/// Support dashboard summary.
pub async fn support_dashboard(
    api: &ApiClient,
    session: &mut Session,
) -> Result<SupportDashboard> {
    api.get(session, SUPPORT_DASHBOARD).await
}

// --- User administration ---

/// All dashboard users.
pub async fn list_users(api: &ApiClient, session: &mut Session) -> Result<Vec<AdminUser>> {
    api.get(session, USERS).await
}

/// Replaces a user's role and component list; returns the stored user.
pub async fn update_user_access(
    api: &ApiClient,
    session: &mut Session,
    user_id: i64,
    update: &UserAccessUpdate,
) -> Result<AdminUser> {
    api.put(session, &format!("{USERS}/{user_id}"), update).await
}
