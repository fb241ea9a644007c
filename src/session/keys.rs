//! Key layout of the session store. No other keys are written.

pub const ACCESS_PREFIX: &str = "access:";
pub const REFRESH_PREFIX: &str = "refresh:";
pub const ACCESS_TO_REFRESH_PREFIX: &str = "access_to_refresh:";

pub fn access(access_uuid: &str) -> String {
    format!("{}{}", ACCESS_PREFIX, access_uuid)
}

pub fn refresh(refresh_uuid: &str) -> String {
    format!("{}{}", REFRESH_PREFIX, refresh_uuid)
}

pub fn access_to_refresh(access_uuid: &str) -> String {
    format!("{}{}", ACCESS_TO_REFRESH_PREFIX, access_uuid)
}
