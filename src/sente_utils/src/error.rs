// Copyright 2024 Karl Sundequist Blomdahl <karl.sundequist.blomdahl@gmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::fmt;
use std::io;

/// Fatal errors that can occur while constructing the engine's long-lived
/// services (the inference service, the thread pool). These never occur on
/// a per-move data path -- see the crate-level error handling notes.
#[derive(Debug)]
pub enum Error {
    /// The model file could not be opened or read.
    Io(io::Error),

    /// The model file was readable but did not contain a usable model
    /// (wrong shape, missing tensor, unsupported version).
    InvalidModel(String),

    /// A device (e.g. an accelerator index) named in the configuration does
    /// not exist or failed to initialize.
    DeviceUnavailable(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match *self {
            Error::Io(ref err) => write!(f, "could not read model file -- {}", err),
            Error::InvalidModel(ref reason) => write!(f, "invalid model -- {}", reason),
            Error::DeviceUnavailable(ref name) => write!(f, "device unavailable -- {}", name)
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match *self {
            Error::Io(ref err) => Some(err),
            _ => None
        }
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        Error::Io(err)
    }
}
