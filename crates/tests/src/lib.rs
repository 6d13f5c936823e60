pub mod fixtures;

#[cfg(test)]
mod chat_tests;
#[cfg(test)]
mod client_sync_tests;
#[cfg(test)]
mod meeting_tests;
#[cfg(test)]
mod permissions_tests;
#[cfg(test)]
mod recording_tests;
