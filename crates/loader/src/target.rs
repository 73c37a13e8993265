/*
 * Copyright (c) Peter Bjorklund. All rights reserved. https://github.com/swamp/swamp
 * Licensed under the MIT License. See LICENSE in the project root for license information.
 */
use mc64k_vm_isa::version::SemanticVersion;

const EXECUTABLE_FLAG: u32 = 1;

/// Contents of the `TrgtInfo` chunk.
///
/// Entry 0 of the version table names the target itself. An executable target has a
/// second entry naming the host it was built against.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct TargetInfo {
    executable: bool,
    dependencies: Vec<(SemanticVersion, String)>,
}

impl TargetInfo {
    pub fn executable(
        name: impl Into<String>,
        version: SemanticVersion,
        host_name: impl Into<String>,
        host_version: SemanticVersion,
    ) -> Self {
        Self {
            executable: true,
            dependencies: vec![(version, name.into()), (host_version, host_name.into())],
        }
    }

    pub fn library(name: impl Into<String>, version: SemanticVersion) -> Self {
        Self {
            executable: false,
            dependencies: vec![(version, name.into())],
        }
    }

    #[must_use]
    pub const fn is_executable(&self) -> bool {
        self.executable
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.dependencies
            .first()
            .map_or("", |(_, name)| name.as_str())
    }

    #[must_use]
    pub fn version(&self) -> Option<SemanticVersion> {
        self.dependencies.first().map(|(version, _)| *version)
    }

    /// Host name and minimum host version of an executable target.
    #[must_use]
    pub fn host_requirement(&self) -> Option<(&str, SemanticVersion)> {
        if !self.executable {
            return None;
        }
        self.dependencies
            .get(1)
            .map(|(version, name)| (name.as_str(), *version))
    }

    /// Checks that a host called `host_name` at `host_version` can run this target.
    /// Non executable targets are accepted without looking at the host.
    pub fn check_host(&self, host_name: &str, host_version: SemanticVersion) -> Result<(), String> {
        if !self.executable {
            return Ok(());
        }
        let Some((required_name, required_version)) = self.host_requirement() else {
            return Err("executable target does not name its host".to_string());
        };
        if !host_version.satisfies(required_version) {
            return Err(format!(
                "requires host version {required_version}, running host is {host_version}"
            ));
        }
        if required_name != host_name {
            return Err(format!(
                "built for host `{required_name}`, running host is `{host_name}`"
            ));
        }
        Ok(())
    }

    pub(crate) fn parse(body: &[u8]) -> Result<Self, String> {
        let mut cursor = 0;
        let flags = read_u32(body, &mut cursor)?;
        let count = read_u32(body, &mut cursor)? as usize;

        let mut versions = Vec::with_capacity(count.min(body.len() / 4));
        for _ in 0..count {
            versions.push(SemanticVersion::from_packed(read_u32(body, &mut cursor)?));
        }

        let mut dependencies = Vec::with_capacity(versions.len());
        for version in versions {
            let rest = &body[cursor..];
            let Some(length) = rest.iter().position(|&byte| byte == 0) else {
                return Err("dependency name is not terminated".to_string());
            };
            let name = std::str::from_utf8(&rest[..length])
                .map_err(|_| "dependency name is not valid utf-8".to_string())?;
            cursor += length + 1;
            dependencies.push((version, name.to_owned()));
        }

        if dependencies.is_empty() {
            return Err("target has no version table entries".to_string());
        }

        Ok(Self {
            executable: flags & EXECUTABLE_FLAG != 0,
            dependencies,
        })
    }

    pub(crate) fn encode(&self, out: &mut Vec<u8>) {
        let flags = if self.executable { EXECUTABLE_FLAG } else { 0 };
        out.extend_from_slice(&flags.to_le_bytes());
        out.extend_from_slice(&(self.dependencies.len() as u32).to_le_bytes());
        for (version, _) in &self.dependencies {
            out.extend_from_slice(&version.packed().to_le_bytes());
        }
        for (_, name) in &self.dependencies {
            out.extend_from_slice(name.as_bytes());
            out.push(0);
        }
    }
}

pub(crate) fn read_u32(bytes: &[u8], cursor: &mut usize) -> Result<u32, String> {
    let end = *cursor + 4;
    let Some(slice) = bytes.get(*cursor..end) else {
        return Err(format!("unexpected end of chunk at offset {}", *cursor));
    };
    *cursor = end;
    let mut value = [0u8; 4];
    value.copy_from_slice(slice);
    Ok(u32::from_le_bytes(value))
}
