pub mod auth;
pub mod evaluation;
pub mod menu;
pub mod order;
pub mod pricing;
pub mod restaurant;
pub mod session;
pub mod token;
pub mod user;

pub use auth::AuthService;
pub use evaluation::EvaluationService;
pub use menu::{MenuService, MenuUpdate, ProductInput};
pub use order::{OrderService, OrderTransition};
pub use restaurant::{NewRestaurant, RestaurantService};
pub use session::SessionService;
pub use token::TokenService;
pub use user::{NewCustomer, UserService};
