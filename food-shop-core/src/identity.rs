use uuid::Uuid;

use crate::error::ServiceError;
use crate::models::{Role, Session};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Permission {
    CreateOrder,
    ListOrders,
    ApproveOrder,
    DispatchOrder,
    DeliverOrder,
    CancelOrder,
    CreateEvaluation,
    AnswerEvaluation,
    ListEvaluations,
    UpdateMenu,
    GetPopularProducts,
}

const MANAGER_PERMISSIONS: &[Permission] = &[
    Permission::ListOrders,
    Permission::ApproveOrder,
    Permission::DispatchOrder,
    Permission::DeliverOrder,
    Permission::CancelOrder,
    Permission::AnswerEvaluation,
    Permission::ListEvaluations,
    Permission::UpdateMenu,
    Permission::GetPopularProducts,
];

const CUSTOMER_PERMISSIONS: &[Permission] =
    &[Permission::CreateOrder, Permission::CreateEvaluation];

impl Role {
    pub fn permissions(self) -> &'static [Permission] {
        match self {
            Role::Manager => MANAGER_PERMISSIONS,
            Role::Customer => CUSTOMER_PERMISSIONS,
        }
    }

    pub fn has_permission(self, permission: Permission) -> bool {
        self.permissions().contains(&permission)
    }
}

/// Who is acting on the current request, resolved from a session.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestIdentity {
    pub user_id: Uuid,
    pub session_id: Uuid,
    pub role: Role,
    pub restaurant_id: Option<Uuid>,
}

impl RequestIdentity {
    pub fn restaurant_id(&self) -> Result<Uuid, ServiceError> {
        self.restaurant_id.ok_or(ServiceError::RestaurantNotFound)
    }
}

impl From<&Session> for RequestIdentity {
    fn from(session: &Session) -> Self {
        Self {
            user_id: session.user_id,
            session_id: session.id,
            role: session.role,
            restaurant_id: session.restaurant_id,
        }
    }
}
