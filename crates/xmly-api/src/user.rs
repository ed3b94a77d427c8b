use reqwest::header::{COOKIE, USER_AGENT};

use crate::client::{PC_UA, XmlyClient};
use crate::models::{UserInfo, UserInfoResponse};
use crate::ApiError;

impl XmlyClient {
    /// Fetch the account behind `cookie`.
    ///
    /// A rejected cookie is not an error: `ret` and `msg` are passed through.
    pub async fn user_info(&self, cookie: &str) -> Result<UserInfo, ApiError> {
        let url = format!("{}/revision/main/getCurrentUser", self.endpoints.web);
        let response: UserInfoResponse = self
            .client
            .get(&url)
            .header(USER_AGENT, PC_UA)
            .header(COOKIE, cookie)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let data = response.data.unwrap_or_default();
        Ok(UserInfo {
            ret: response.ret,
            msg: response.msg,
            uid: data.uid,
            is_vip: data.is_vip,
            nickname: data.nickname,
        })
    }
}
