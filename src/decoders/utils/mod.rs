pub(crate) mod avframe;
pub(crate) mod packet;
