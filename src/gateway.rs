pub mod ddb;
pub mod events;
pub mod logs;
pub mod sns;
pub mod factory;

#[derive(Debug, PartialEq)]
pub(crate) enum GatewayPublisherVia {
    Sns,
    LocalDynamoDB,
    Log,
}
