pub mod logger;

pub mod binding;
pub mod component;
pub mod config;
pub mod dispatcher;
pub mod event;
pub mod grid;
pub mod i18n;
pub mod icons;
pub mod keys;
pub mod notification_access;
pub mod observer;
pub mod os_settings;
pub mod restart;
pub mod screen;
pub mod session;
pub mod store;
