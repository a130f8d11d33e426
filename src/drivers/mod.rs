// Hardware drivers — chip-level and protocol-level, board-independent.
//
// The chip driver only talks to the `Interface` trait; the bit-banged
// bus is one implementation of it. Pin assignments live in board/.

pub mod bitbang;
pub mod interface;
pub mod tm1637;
