//! Backend record shapes.
//!
//! These mirror the JSON the platform's REST API sends and accepts (camelCase
//! keys). The backend owns every one of them; the console only holds copies.

pub mod complaint;
pub mod delivery;
pub mod directory;
pub mod product;
pub mod user;

pub use complaint::{Complaint, ComplaintStatus, ComplaintStatusUpdate};
pub use delivery::{DeliveryArea, DeliveryPeriod, PeriodWindow, VehicleType};
pub use directory::{Employee, ForemanCustomer, Referral, SupportDashboard, SupportTicket};
pub use product::{DiscountConfig, DiscountKind, Product, StockUpdate};
pub use user::{AdminUser, LoginResponse, TokenPair, UserAccessUpdate};
