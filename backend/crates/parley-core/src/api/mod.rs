//! JSON bodies exchanged between the browser/CLI client and the server.

pub mod requests;
pub mod responses;

pub use requests::{
    LoginRequest, RegisterRequest, SendMessageRequest, SendOtpRequest, VerifyOtpRequest,
};
pub use responses::{
    ErrorResponse, FileContentResponse, LoginResponse, RegisterResponse, SendOtpResponse,
    UploadResponse, VerifyOtpResponse,
};
