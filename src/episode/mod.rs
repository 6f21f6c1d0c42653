// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

mod model;
mod title;

pub use model::{DURATION_UNKNOWN, Episode};
pub(crate) use model::new_episode_id;
pub use title::normalize_title;
