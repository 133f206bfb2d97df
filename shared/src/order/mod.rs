//! Order domain types shared between the service and its clients

pub mod event;
pub mod model;
pub mod types;
pub mod view;

pub use event::{EventPayload, OrderEvent, OrderEventType};
pub use model::{Order, PlacedBy};
pub use types::{
    CreateOrderInput, ItemStatus, ModifierSelection, OrderItem, OrderItemInput, OrderStatus,
    PaymentSource, PaymentStatus,
};
pub use view::{
    AdminOrderView, CustomerItemView, CustomerOrderView, KitchenItemView, KitchenTicketView,
    RoleView, WaiterOrderView,
};
