pub mod otp;

pub use otp::{
    ClearCodeRequest, SendCodeRequest, SendCodeResponse, VerifyCodeRequest, VerifyCodeResponse,
};
