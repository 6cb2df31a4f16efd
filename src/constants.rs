use jsonwebtoken::Algorithm;

/// 令牌签名算法
pub const ALGORITHM: Algorithm = Algorithm::HS256;

/// 令牌有效期（分钟）
pub const ACCESS_TOKEN_EXPIRE_MINUTES: i64 = 60;

/// 配送接口的密钥请求头
pub const DELIVERY_KEY_HEADER: &str = "x-api-key";

pub const ENV_DATABASE_URL: &str = "DATABASE_URL";
pub const ENV_SECRET_KEY: &str = "SECRET_KEY";
pub const ENV_DELIVERY_API_KEY: &str = "DELIVERY_API_KEY";
pub const ENV_DATABASE_ECHO: &str = "DATABASE_ECHO";
pub const ENV_PORT: &str = "PORT";
pub const ENV_BCRYPT_COST: &str = "BCRYPT_COST";

pub const DEFAULT_PORT: u16 = 8000;

pub const DEFAULT_DATABASE_ECHO: bool = true;
