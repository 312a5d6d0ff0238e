//! Common types shared between the compiler and device implementations

use std::fmt;

/// Hardware command queue a pass is submitted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QueueType {
    /// Graphics queue, also accepts compute and copy work
    Main,
    /// Asynchronous compute queue
    Compute,
    /// Dedicated copy/transfer queue
    Copy,
}

impl QueueType {
    /// All queues in index order
    pub const ALL: [QueueType; 3] = [QueueType::Main, QueueType::Compute, QueueType::Copy];

    pub const fn index(self) -> usize {
        match self {
            QueueType::Main => 0,
            QueueType::Compute => 1,
            QueueType::Copy => 2,
        }
    }

    pub fn mask(self) -> QueueMask {
        match self {
            QueueType::Main => QueueMask::MAIN,
            QueueType::Compute => QueueMask::COMPUTE,
            QueueType::Copy => QueueMask::COPY,
        }
    }

    /// Index of the enter-fence slot this queue uses for work coming from `other`.
    ///
    /// Each pass has two slots, one per foreign queue, ordered by queue index.
    /// Returns `None` when `other` is the same queue.
    pub fn other_slot(self, other: QueueType) -> Option<usize> {
        use std::cmp::Ordering;
        match other.index().cmp(&self.index()) {
            Ordering::Less => Some(other.index()),
            Ordering::Equal => None,
            Ordering::Greater => Some(other.index() - 1),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            QueueType::Main => "main",
            QueueType::Compute => "compute",
            QueueType::Copy => "copy",
        }
    }
}

impl fmt::Display for QueueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

bitflags::bitflags! {
    /// Set of queues, used for enter-sync requirements and exit-sync targets
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct QueueMask: u8 {
        const MAIN = 1 << 0;
        const COMPUTE = 1 << 1;
        const COPY = 1 << 2;
    }
}

impl QueueMask {
    /// Iterate the queues contained in this mask in index order
    pub fn queues(self) -> impl Iterator<Item = QueueType> {
        QueueType::ALL
            .into_iter()
            .filter(move |queue| self.contains(queue.mask()))
    }
}

impl fmt::Display for QueueMask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("none");
        }
        let mut first = true;
        for queue in self.queues() {
            if !first {
                f.write_str("+")?;
            }
            first = false;
            f.write_str(queue.name())?;
        }
        Ok(())
    }
}

/// State a resource must be in while a pass accesses it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceState {
    Common,
    RenderTarget,
    DepthWrite,
    DepthRead,
    ShaderResource,
    UnorderedAccess,
    CopySource,
    CopyDest,
    Present,
}

impl ResourceState {
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            ResourceState::RenderTarget
                | ResourceState::DepthWrite
                | ResourceState::UnorderedAccess
                | ResourceState::CopyDest
        )
    }

    pub fn is_read(&self) -> bool {
        matches!(
            self,
            ResourceState::DepthRead
                | ResourceState::ShaderResource
                | ResourceState::UnorderedAccess
                | ResourceState::CopySource
                | ResourceState::Present
        )
    }
}

/// Texture format of a transient texture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFormat {
    Rgba8Unorm,
    Bgra8Unorm,
    Rgba16Float,
    Rgba32Float,
    R8Unorm,
    R32Float,
    Rg32Float,
    Depth32Float,
    Depth24PlusStencil8,
}

impl TextureFormat {
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            TextureFormat::R8Unorm => 1,
            TextureFormat::Rgba8Unorm
            | TextureFormat::Bgra8Unorm
            | TextureFormat::Depth32Float
            | TextureFormat::Depth24PlusStencil8
            | TextureFormat::R32Float => 4,
            TextureFormat::Rgba16Float | TextureFormat::Rg32Float => 8,
            TextureFormat::Rgba32Float => 16,
        }
    }
}
