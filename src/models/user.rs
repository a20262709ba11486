use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// 사용자 역할. 문자열은 정확히 일치해야 하며 역할 간 상하 관계는 없습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Role {
    #[serde(rename = "Admin")]
    Admin,
    #[serde(rename = "Platform_Manager")]
    PlatformManager,
    #[serde(rename = "PIN_Support")]
    PinSupport,
    #[serde(rename = "Csr_Rep")]
    CsrRep,
}

impl Role {
    pub const ALL: [Role; 4] = [Role::Admin, Role::PlatformManager, Role::PinSupport, Role::CsrRep];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::PlatformManager => "Platform_Manager",
            Role::PinSupport => "PIN_Support",
            Role::CsrRep => "Csr_Rep",
        }
    }

    /// 로그인 후 UI가 이동할 역할별 페이지 토큰
    pub fn landing_page(&self) -> &'static str {
        match self {
            Role::Admin => "role_page.Admin",
            Role::PlatformManager => "role_page.Platform_Manager",
            Role::PinSupport => "role_page.PIN_Support",
            Role::CsrRep => "role_page.Csr_Rep",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| AppError::validation(format!("unknown role: {}", s)))
    }
}

/// 역할 문자열 → 페이지 토큰. 알 수 없는 역할이면 None.
pub fn role_endpoint_for(role: &str) -> Option<&'static str> {
    role.parse::<Role>().ok().map(|r| r.landing_page())
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    pub user_id: i64,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub created_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    pub id: i64,
    pub username: String,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role: String,
    pub created_at: String,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.user_id,
            username: user.username,
            full_name: user.full_name,
            email: user.email,
            role: user.role,
            created_at: user.created_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub user: UserProfile,
    pub access_token: String,
    /// 역할별 페이지 토큰 (`role_page.Csr_Rep` 등)
    pub destination: Option<&'static str>,
}

#[derive(Debug, Default, Deserialize)]
pub struct CreateUserRequest {
    pub username: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateUserRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub role: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UserSearchQuery {
    pub search: Option<String>,
}
